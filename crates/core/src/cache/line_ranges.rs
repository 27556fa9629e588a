//! Bounded cache of per-document range lists.
//!
//! Entries are keyed by (repository, revision, path). When an insert would
//! exceed the byte budget, arbitrary entries are evicted until it fits.

use codenav_api::{Range, RepositoryId};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineRangeKey {
    pub repository_id: RepositoryId,
    pub revision: String,
    pub path: String,
}

impl LineRangeKey {
    pub fn new(repository_id: RepositoryId, revision: &str, path: &str) -> Self {
        Self {
            repository_id,
            revision: revision.to_string(),
            path: path.to_string(),
        }
    }

    fn cost(&self, ranges: &[Range]) -> usize {
        std::mem::size_of::<Self>()
            + self.revision.len()
            + self.path.len()
            + std::mem::size_of_val(ranges)
    }
}

#[derive(Debug, Default)]
struct Entries {
    map: HashMap<LineRangeKey, Vec<Range>>,
    used_bytes: usize,
}

#[derive(Debug)]
pub struct LineRangeCache {
    budget_bytes: usize,
    entries: RwLock<Entries>,
}

impl LineRangeCache {
    /// A zero budget disables caching.
    pub fn new(budget_bytes: usize) -> Self {
        Self {
            budget_bytes,
            entries: RwLock::new(Entries::default()),
        }
    }

    pub fn get(&self, key: &LineRangeKey) -> Option<Vec<Range>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.map.get(key).cloned()
    }

    pub fn insert(&self, key: LineRangeKey, ranges: Vec<Range>) {
        let cost = key.cost(&ranges);
        if cost > self.budget_bytes {
            return;
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(old) = entries.map.remove(&key) {
            entries.used_bytes -= key.cost(&old);
        }
        while entries.used_bytes + cost > self.budget_bytes {
            let Some(victim) = entries.map.keys().next().cloned() else {
                break;
            };
            if let Some(evicted) = entries.map.remove(&victim) {
                entries.used_bytes -= victim.cost(&evicted);
            }
        }
        entries.used_bytes += cost;
        entries.map.insert(key, ranges);
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn used_bytes(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .used_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges(n: u32) -> Vec<Range> {
        (0..n).map(|i| Range::new(i, 0, i, 1)).collect()
    }

    #[test]
    fn hit_after_insert() {
        let cache = LineRangeCache::new(1 << 20);
        let key = LineRangeKey::new(1, "abc", "a.go");
        assert!(cache.get(&key).is_none());
        cache.insert(key.clone(), ranges(3));
        assert_eq!(cache.get(&key), Some(ranges(3)));
    }

    #[test]
    fn evicts_to_stay_within_budget() {
        let one = LineRangeKey::new(1, "abc", "a.go").cost(&ranges(10));
        let cache = LineRangeCache::new(one * 2);
        for path in ["a.go", "b.go", "c.go", "d.go"] {
            cache.insert(LineRangeKey::new(1, "abc", path), ranges(10));
            assert!(cache.used_bytes() <= one * 2);
        }
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&LineRangeKey::new(1, "abc", "d.go")).is_some());
    }

    #[test]
    fn oversized_entries_are_not_cached() {
        let cache = LineRangeCache::new(16);
        cache.insert(LineRangeKey::new(1, "abc", "a.go"), ranges(100));
        assert!(cache.is_empty());
    }

    #[test]
    fn replacing_an_entry_reuses_its_budget() {
        let cache = LineRangeCache::new(1 << 20);
        let key = LineRangeKey::new(1, "abc", "a.go");
        cache.insert(key.clone(), ranges(10));
        let before = cache.used_bytes();
        cache.insert(key.clone(), ranges(10));
        assert_eq!(cache.used_bytes(), before);
        assert_eq!(cache.len(), 1);
    }
}
