use serde::{Deserialize, Serialize};

/// One role or channel as seen by the requesting user.
///
/// `can_manage` is the permission annotation supplied by the platform (manage
/// roles for a role, manage permissions for a channel). `linked` marks rows
/// the bot already tracks: a role with a button, a channel tied to a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRow {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub can_manage: bool,
    #[serde(default)]
    pub linked: bool,
}

impl ListingRow {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            can_manage: false,
            linked: false,
        }
    }

    pub fn manageable(mut self, can_manage: bool) -> Self {
        self.can_manage = can_manage;
        self
    }

    pub fn linked(mut self, linked: bool) -> Self {
        self.linked = linked;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Listing {
    rows: Vec<ListingRow>,
}

impl Listing {
    pub fn new(rows: Vec<ListingRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[ListingRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn retain(mut self, f: impl FnMut(&ListingRow) -> bool) -> Self {
        self.rows.retain(f);
        self
    }

    /// `(id, name)` pairs in listing order, the shape select menus are built from.
    pub fn options(&self) -> Vec<(String, String)> {
        self.rows
            .iter()
            .map(|row| (row.id.to_string(), row.name.clone()))
            .collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.name.as_str()).collect()
    }

    /// Marks every row whose id is in `ids` as linked.
    pub fn mark_linked(mut self, ids: &[u64]) -> Self {
        for row in &mut self.rows {
            if ids.contains(&row.id) {
                row.linked = true;
            }
        }
        self
    }
}

impl FromIterator<ListingRow> for Listing {
    fn from_iter<I: IntoIterator<Item = ListingRow>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}
