//! Visibility-driven deferred loading.
//!
//! Resources are registered up front and resolved the first time they are
//! reported visible. A resolved key is never handed out again, even if the
//! fetch that follows fails.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// A deferred resource that just became visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<K> {
    pub key: K,
    pub source: String,
}

#[derive(Debug, Clone)]
pub struct LazyLoader<K> {
    pending: HashMap<K, String>,
    resolved: HashSet<K>,
}

impl<K> Default for LazyLoader<K> {
    fn default() -> Self {
        Self {
            pending: HashMap::new(),
            resolved: HashSet::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> LazyLoader<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start observing `key`. Returns false if it is already observed or was
    /// resolved before.
    pub fn register(&mut self, key: K, source: impl Into<String>) -> bool {
        if self.resolved.contains(&key) || self.pending.contains_key(&key) {
            return false;
        }
        self.pending.insert(key, source.into());
        true
    }

    /// Report which keys are currently in the viewport.
    ///
    /// Every pending key among them is resolved once, in the order given, and
    /// stops being observed.
    pub fn observe<'a, I>(&mut self, visible: I) -> Vec<Resolved<K>>
    where
        I: IntoIterator<Item = &'a K>,
        K: 'a,
    {
        let mut out = Vec::new();
        for key in visible {
            if let Some(source) = self.pending.remove(key) {
                self.resolved.insert(key.clone());
                out.push(Resolved {
                    key: key.clone(),
                    source,
                });
            }
        }
        out
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    pub fn is_resolved(&self, key: &K) -> bool {
        self.resolved.contains(key)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn resolved_len(&self) -> usize {
        self.resolved.len()
    }

    /// Stop observing everything still pending; resolved keys stay resolved.
    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_only_visible_keys() {
        let mut loader = LazyLoader::new();
        loader.register(1, "one.png");
        loader.register(2, "two.png");
        loader.register(3, "three.png");

        let resolved = loader.observe(&[3, 1]);
        assert_eq!(
            resolved,
            vec![
                Resolved {
                    key: 3,
                    source: "three.png".to_string()
                },
                Resolved {
                    key: 1,
                    source: "one.png".to_string()
                },
            ]
        );
        assert!(loader.is_pending(&2));
        assert_eq!(loader.pending_len(), 1);
    }

    #[test]
    fn test_each_key_resolves_at_most_once() {
        let mut loader = LazyLoader::new();
        loader.register("a", "a.png");

        assert_eq!(loader.observe(&["a"]).len(), 1);
        assert!(loader.observe(&["a"]).is_empty());

        // Re-registering after resolution does not re-arm the key.
        assert!(!loader.register("a", "a.png"));
        assert!(loader.observe(&["a"]).is_empty());
        assert!(loader.is_resolved(&"a"));
    }

    #[test]
    fn test_duplicate_registration_is_ignored() {
        let mut loader = LazyLoader::new();
        assert!(loader.register("a", "first.png"));
        assert!(!loader.register("a", "second.png"));
        assert_eq!(loader.observe(&["a"])[0].source, "first.png");
    }

    #[test]
    fn test_unregistered_keys_are_ignored() {
        let mut loader: LazyLoader<u32> = LazyLoader::new();
        assert!(loader.observe(&[7, 8]).is_empty());
        assert_eq!(loader.resolved_len(), 0);
    }

    #[test]
    fn test_clear_pending_keeps_resolved() {
        let mut loader = LazyLoader::new();
        loader.register(1, "one.png");
        loader.register(2, "two.png");
        loader.observe(&[1]);
        loader.clear_pending();

        assert_eq!(loader.pending_len(), 0);
        assert!(loader.is_resolved(&1));
        assert!(!loader.register(1, "one.png"));
        assert!(loader.register(2, "two.png"));
    }
}
