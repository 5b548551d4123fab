// ── Loading set ──
//
// Name-keyed set of in-flight operations. Overlapping operations under
// different names are tracked independently; the same name twice is
// still one entry.

use dashmap::DashSet;

/// Shared set of operation names currently loading.
#[derive(Debug, Default)]
pub struct LoadingSet {
    names: DashSet<String>,
}

impl LoadingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, names: &[&str]) {
        for name in names {
            self.names.insert((*name).to_owned());
        }
    }

    pub fn remove(&self, names: &[&str]) {
        for name in names {
            self.names.remove(*name);
        }
    }

    /// True if any of `names` is loading. With no names, true if anything is.
    pub fn is_loading(&self, names: &[&str]) -> bool {
        if names.is_empty() {
            return self.any();
        }
        names.iter().any(|name| self.names.contains(*name))
    }

    pub fn any(&self) -> bool {
        !self.names.is_empty()
    }

    /// Mark `name` as loading until the returned guard drops.
    pub fn track(&self, name: &str) -> LoadingGuard<'_> {
        self.add(&[name]);
        LoadingGuard {
            set: self,
            name: name.to_owned(),
        }
    }
}

/// Removes its name from the [`LoadingSet`] on drop.
#[must_use = "the name is removed as soon as the guard drops"]
pub struct LoadingGuard<'a> {
    set: &'a LoadingSet,
    name: String,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.set.names.remove(&self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_of_semantics() {
        let loading = LoadingSet::new();
        loading.add(&["albums", "user"]);

        assert!(loading.is_loading(&["comments", "user"]));
        assert!(!loading.is_loading(&["comments"]));

        loading.remove(&["albums", "user"]);
        assert!(!loading.any());
    }

    #[test]
    fn guard_clears_on_drop() {
        let loading = LoadingSet::new();
        {
            let _guard = loading.track("login");
            assert!(loading.is_loading(&["login"]));
            assert!(loading.is_loading(&[]));
        }
        assert!(!loading.is_loading(&["login"]));
    }
}
