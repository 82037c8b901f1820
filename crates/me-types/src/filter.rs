use crate::listing::{Listing, ListingRow};

/// Boolean column of a [`ListingRow`] a filter can test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowField {
    CanManage,
    Linked,
}

impl RowField {
    fn read(self, row: &ListingRow) -> bool {
        match self {
            Self::CanManage => row.can_manage,
            Self::Linked => row.linked,
        }
    }
}

/// A predicate over one flag column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowFilter {
    field: RowField,
    expected: bool,
}

impl RowFilter {
    /// Keeps rows where `field == expected`.
    pub fn is(field: RowField, expected: bool) -> Self {
        Self { field, expected }
    }

    pub fn matches(&self, row: &ListingRow) -> bool {
        self.field.read(row) == self.expected
    }
}

/// Filters applied one after another.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterChain {
    filters: Vec<RowFilter>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, filter: RowFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn apply(&self, listing: Listing) -> Listing {
        self.filters
            .iter()
            .fold(listing, |listing, f| listing.retain(|row| f.matches(row)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> Listing {
        Listing::new(vec![
            ListingRow::new(1, "general").manageable(true),
            ListingRow::new(2, "mods").manageable(true).linked(true),
            ListingRow::new(3, "announcements"),
        ])
    }

    #[test]
    fn chain_applies_filters_in_sequence() {
        let chain = FilterChain::new()
            .with(RowFilter::is(RowField::Linked, false))
            .with(RowFilter::is(RowField::CanManage, true));
        let names = chain.apply(listing()).names().join(",");
        assert_eq!(names, "general");
    }

    #[test]
    fn empty_chain_keeps_everything() {
        assert_eq!(FilterChain::new().apply(listing()).len(), 3);
    }

    #[test]
    fn linked_rows_only() {
        let chain = FilterChain::new().with(RowFilter::is(RowField::Linked, true));
        assert_eq!(chain.apply(listing()).names(), vec!["mods"]);
    }
}
