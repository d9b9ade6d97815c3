use crate::document::ElementId;
use std::collections::HashMap;

/// Mapping from object name to the actual element declaring it.
///
/// Several actual elements may claim the same name while a document is being
/// edited. Such a name is ambiguous and resolves to nothing, so every link
/// using it is reported broken until the clash is gone.
#[derive(Debug, Default, Clone)]
pub struct NameMap {
    entries: HashMap<String, Vec<ElementId>>,
}

impl NameMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from `(name, element)` pairs in document order.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, ElementId)>,
        S: Into<String>,
    {
        let mut map = Self::new();
        for (name, id) in pairs {
            map.insert(name, id);
        }
        map
    }

    pub fn insert(&mut self, name: impl Into<String>, id: ElementId) {
        let ids = self.entries.entry(name.into()).or_default();
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    pub fn remove(&mut self, name: &str, id: ElementId) {
        if let Some(ids) = self.entries.get_mut(name) {
            ids.retain(|&existing| existing != id);
            if ids.is_empty() {
                self.entries.remove(name);
            }
        }
    }

    /// Resolve a name to the single actual element carrying it.
    pub fn resolve(&self, name: &str) -> Option<ElementId> {
        match self.entries.get(name).map(Vec::as_slice) {
            Some([only]) => Some(*only),
            _ => None,
        }
    }

    pub fn is_ambiguous(&self, name: &str) -> bool {
        self.entries.get(name).is_some_and(|ids| ids.len() > 1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
