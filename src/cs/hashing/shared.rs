//! # Shared Perfect Hash Map
//!
//! [`PerfectHashMap`] assumes a single owner. `SharedPerfectHashMap` puts it behind a
//! `RwLock` so several threads can use one table: searches take the read lock and run
//! concurrently, `insert`/`erase` take the write lock.
//!
//! A poisoned lock is recovered rather than propagated. `insert`, `try_insert` and `erase`
//! are each a single cell write plus a counter update and never leave the table
//! half-updated. A closure passed to [`write`](SharedPerfectHashMap::write) that
//! panics partway through keeps whatever mutations it already made.
//!
//! ```rust
//! use std::sync::Arc;
//! use hashtables::cs::hashing::perfect::PerfectHashMap;
//! use hashtables::cs::hashing::shared::SharedPerfectHashMap;
//!
//! let map = PerfectHashMap::new(vec![1u32, 2, 3]).unwrap();
//! let shared = Arc::new(SharedPerfectHashMap::new(map));
//! assert!(shared.insert(2, "two"));
//!
//! let reader = Arc::clone(&shared);
//! let got = std::thread::spawn(move || reader.get_cloned(&2)).join().unwrap();
//! assert_eq!(got, Some("two"));
//! ```

use std::hash::{BuildHasher, Hash};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::fnv::FnvBuildHasher;
use super::perfect::PerfectHashMap;
use crate::error::Result;

/// A [`PerfectHashMap`] guarded by a read-write lock.
#[derive(Debug)]
pub struct SharedPerfectHashMap<K, V, S = FnvBuildHasher> {
    inner: RwLock<PerfectHashMap<K, V, S>>,
}

impl<K, V, S> SharedPerfectHashMap<K, V, S> {
    pub fn new(map: PerfectHashMap<K, V, S>) -> Self {
        Self {
            inner: RwLock::new(map),
        }
    }

    /// Unwraps the table.
    pub fn into_inner(self) -> PerfectHashMap<K, V, S> {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` with shared access to the table.
    pub fn read<R>(&self, f: impl FnOnce(&PerfectHashMap<K, V, S>) -> R) -> R {
        f(&self.read_guard())
    }

    /// Runs `f` with exclusive access to the table.
    pub fn write<R>(&self, f: impl FnOnce(&mut PerfectHashMap<K, V, S>) -> R) -> R {
        f(&mut self.write_guard())
    }

    pub fn len(&self) -> usize {
        self.read_guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_guard().is_empty()
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, PerfectHashMap<K, V, S>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, PerfectHashMap<K, V, S>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> SharedPerfectHashMap<K, V, S> {
    pub fn try_insert(&self, key: K, value: V) -> Result<()> {
        self.write_guard().try_insert(key, value)
    }

    pub fn insert(&self, key: K, value: V) -> bool {
        self.write_guard().insert(key, value)
    }

    pub fn erase(&self, key: &K) -> Option<V> {
        self.write_guard().erase(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.read_guard().contains_key(key)
    }

    /// Copy of the value stored for `key`; references cannot outlive the read lock.
    pub fn get_cloned(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.read_guard().get(key).cloned()
    }
}

impl<K: Hash + Eq + Clone, V, S: BuildHasher + Clone> SharedPerfectHashMap<K, V, S> {
    /// Grows the table under the write lock; see [`PerfectHashMap::rebuild_with`].
    pub fn rebuild_with<I: IntoIterator<Item = K>>(&self, extra: I) -> Result<()> {
        self.write_guard().rebuild_with(extra)
    }
}

impl<K, V, S> From<PerfectHashMap<K, V, S>> for SharedPerfectHashMap<K, V, S> {
    fn from(map: PerfectHashMap<K, V, S>) -> Self {
        Self::new(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cs::hashing::perfect::PerfectHashMapBuilder;
    use std::thread;

    fn shared_table(n: u64) -> SharedPerfectHashMap<u64, u64> {
        let map = PerfectHashMapBuilder::new()
            .with_seed(31)
            .build((0..n).collect::<Vec<_>>())
            .unwrap();
        SharedPerfectHashMap::new(map)
    }

    #[test]
    fn concurrent_writers_and_readers() {
        let shared = shared_table(1000);
        thread::scope(|s| {
            for t in 0..4u64 {
                let shared = &shared;
                s.spawn(move || {
                    for k in (t..1000).step_by(4) {
                        assert!(shared.insert(k, k * 10));
                    }
                });
            }
        });
        assert_eq!(shared.len(), 1000);

        thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for k in 0..1000u64 {
                        assert_eq!(shared.get_cloned(&k), Some(k * 10));
                    }
                });
            }
        });
    }

    #[test]
    fn erase_and_closures() {
        let shared = shared_table(10);
        assert!(shared.is_empty());
        assert!(shared.insert(3, 30));
        assert!(!shared.insert(3, 31));
        assert_eq!(shared.read(|m| m.duplicate_inserts()), 1);
        shared.write(|m| *m.get_mut(&3).unwrap() += 1);
        assert_eq!(shared.erase(&3), Some(31));
        assert!(!shared.contains_key(&3));

        let map = shared.into_inner();
        assert_eq!(map.len(), 0);
        assert_eq!(map.bucket_count(), 10);
    }

    #[test]
    fn rebuild_under_lock() {
        let shared = shared_table(4);
        assert!(shared.insert(1, 10));
        shared.rebuild_with(vec![4, 5, 5]).unwrap();
        assert_eq!(shared.read(|m| m.bucket_count()), 6);
        assert_eq!(shared.get_cloned(&1), Some(10));
        assert!(shared.insert(5, 50));
    }
}
