// ── Album filters ──
//
// Active and available filter values per key. Active filters feed the
// album list query, multi-valued keys joined with commas.

use std::sync::RwLock;

use indexmap::{IndexMap, IndexSet};

type FilterMap = IndexMap<String, IndexSet<String>>;

#[derive(Debug, Default)]
pub struct AlbumFilters {
    active: RwLock<FilterMap>,
    available: RwLock<FilterMap>,
}

impl AlbumFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add values to a key's active set. An empty `values` clears the key.
    pub fn set<I, S>(&self, key: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        let mut active = self.active.write().expect("filters lock poisoned");
        let entry = active.entry(key.to_owned()).or_default();
        if values.is_empty() {
            entry.clear();
        } else {
            entry.extend(values);
        }
    }

    /// Clear a key's active values.
    pub fn remove(&self, key: &str) {
        if let Some(values) = self
            .active
            .write()
            .expect("filters lock poisoned")
            .get_mut(key)
        {
            values.clear();
        }
    }

    pub fn reset(&self) {
        self.active.write().expect("filters lock poisoned").clear();
        self.available.write().expect("filters lock poisoned").clear();
    }

    pub fn set_available<I, S>(&self, key: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.available
            .write()
            .expect("filters lock poisoned")
            .insert(key.to_owned(), values.into_iter().map(Into::into).collect());
    }

    pub fn active(&self) -> FilterMap {
        self.active.read().expect("filters lock poisoned").clone()
    }

    pub fn available(&self) -> FilterMap {
        self.available.read().expect("filters lock poisoned").clone()
    }

    pub fn active_filter(&self, key: &str) -> IndexSet<String> {
        self.active
            .read()
            .expect("filters lock poisoned")
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// Query pairs for the non-empty active filters.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.active
            .read()
            .expect("filters lock poisoned")
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(key, values)| {
                let joined: Vec<&str> = values.iter().map(String::as_str).collect();
                (key.clone(), joined.join(","))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn set_accumulates_unique_values() {
        let filters = AlbumFilters::new();
        filters.set("user", ["tmtu"]);
        filters.set("user", ["jokler", "tmtu"]);

        let values: Vec<String> = filters.active_filter("user").into_iter().collect();
        assert_eq!(values, ["tmtu", "jokler"]);
        assert_eq!(
            filters.query_pairs(),
            [("user".to_owned(), "tmtu,jokler".to_owned())]
        );
    }

    #[test]
    fn empty_set_and_remove_clear_key() {
        let filters = AlbumFilters::new();
        filters.set("user", ["tmtu"]);
        filters.set("user", Vec::<String>::new());
        assert!(filters.active_filter("user").is_empty());

        filters.set("year", ["2022"]);
        filters.remove("year");
        assert!(filters.query_pairs().is_empty());
    }

    #[test]
    fn reset_clears_both_sets() {
        let filters = AlbumFilters::new();
        filters.set("user", ["tmtu"]);
        filters.set_available("user", ["tmtu", "jokler"]);

        filters.reset();

        assert!(filters.active().is_empty());
        assert!(filters.available().is_empty());
    }
}
