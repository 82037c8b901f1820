use crate::filter::FilterChain;

/// A single value carried between dialogs.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextValue {
    Text(String),
    List(Vec<String>),
    Flag(bool),
    Filter(FilterChain),
    /// Only meaningful inside a contribution: merging it removes the key.
    /// A stored map never holds this variant.
    Unset,
}

impl ContextValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(b) => Some(*b),
            _ => None,
        }
    }

    /// Text values read as a one-element list.
    pub fn to_list(&self) -> Vec<String> {
        match self {
            Self::Text(s) => vec![s.clone()],
            Self::List(values) => values.clone(),
            _ => Vec::new(),
        }
    }
}

impl From<&str> for ContextValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for ContextValue {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

impl From<Vec<String>> for ContextValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values)
    }
}

impl From<FilterChain> for ContextValue {
    fn from(chain: FilterChain) -> Self {
        Self::Filter(chain)
    }
}

/// Ordered key/value state threaded from one dialog to the next.
///
/// Keys keep their first insertion position; overwriting a key replaces the
/// value in place. Maps are small (a handful of form fields), so lookups are
/// linear.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextMap {
    entries: Vec<(String, ContextValue)>,
}

impl ContextMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.entries
            .iter()
            .find(|(k, v)| k == key && *v != ContextValue::Unset)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ContextValue::as_text)
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(ContextValue::as_flag)
    }

    pub fn list(&self, key: &str) -> Vec<String> {
        self.get(key).map(ContextValue::to_list).unwrap_or_default()
    }

    pub fn filter(&self, key: &str) -> Option<&FilterChain> {
        match self.get(key) {
            Some(ContextValue::Filter(chain)) => Some(chain),
            _ => None,
        }
    }

    /// Raw insert. Keeps `Unset` markers, which is what a contribution wants;
    /// use [`ContextMap::merge`] to apply one onto stored state.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ContextValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<ContextValue> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    /// Last-writer-wins merge. `Unset` values delete the key.
    pub fn merge(&mut self, other: ContextMap) {
        for (key, value) in other.entries {
            if value == ContextValue::Unset {
                self.remove(&key);
            } else {
                self.insert(key, value);
            }
        }
    }

    /// The entries whose keys are listed in `keys`, in this map's order.
    pub fn retain_keys<S: AsRef<str>>(&self, keys: &[S]) -> ContextMap {
        let entries = self
            .entries
            .iter()
            .filter(|(k, v)| *v != ContextValue::Unset && keys.iter().any(|key| key.as_ref() == k))
            .cloned()
            .collect();
        ContextMap { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContextValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl<K: Into<String>, V: Into<ContextValue>> FromIterator<(K, V)> for ContextMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = ContextMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}
