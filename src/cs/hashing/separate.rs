//! # Separate Chaining Hash Table
//!
//! This module implements a **HashMap** using **separate chaining**. Every bucket is a
//! [`DLinkedList`] of `(key, value)` pairs; colliding keys simply share a chain.
//!
//! - **Generic** key-value pairs (`K: Hash + Eq, V`).
//! - **Multiplication method** for bucket selection: `floor(m * frac(h * A))` with
//!   `A = (√5 - 1) / 2`, computed in 64-bit fixed point, so any bucket count works.
//! - **Configurable** load factor and hasher (`BuildHasher`), doubling the bucket count when
//!   the load factor is exceeded.
//! - **Insert**, **get**, **remove**, **iter** with expected **O(1)** cost.

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash};

use log::debug;

use super::linked_list::DLinkedList;
use super::universal::base_hash;
use crate::error::{Error, Result};

/// Default initial bucket count if none specified.
const DEFAULT_INITIAL_CAPACITY: usize = 32;

/// Default maximum load factor before resizing.
const DEFAULT_MAX_LOAD_FACTOR: f64 = 0.75;

/// `2^64 * (√5 - 1) / 2`, Knuth's multiplicative constant.
const KNUTH_MULTIPLIER: u64 = 0x9E3779B97F4A7C15;

/// A separate-chaining HashMap with generic `K, V` and a customizable hasher.
#[derive(Debug, Clone)]
pub struct ChainedHashMap<K, V, S = RandomState> {
    buckets: Vec<DLinkedList<K, V>>,
    /// The number of stored key-value pairs.
    len: usize,
    /// The maximum load factor (ratio = len / bucket_count).
    max_load_factor: f64,
    build_hasher: S,
}

/// A builder for the `ChainedHashMap`.
#[derive(Debug, Clone)]
pub struct ChainedHashMapBuilder<S> {
    capacity: usize,
    max_load_factor: f64,
    hasher: S,
}

impl Default for ChainedHashMapBuilder<RandomState> {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_INITIAL_CAPACITY,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
            hasher: RandomState::new(),
        }
    }
}

impl ChainedHashMapBuilder<RandomState> {
    /// Creates a new builder with default capacity and default hasher (RandomState).
    pub fn new() -> Self {
        Default::default()
    }
}

impl<S: BuildHasher> ChainedHashMapBuilder<S> {
    /// Sets the initial number of buckets (at least one).
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Sets the maximum load factor. If `len / bucket_count` exceeds it, we resize.
    pub fn with_max_load_factor(mut self, lf: f64) -> Self {
        self.max_load_factor = lf;
        self
    }

    /// Sets a custom hasher builder.
    pub fn with_hasher<T: BuildHasher>(self, hasher: T) -> ChainedHashMapBuilder<T> {
        ChainedHashMapBuilder {
            capacity: self.capacity,
            max_load_factor: self.max_load_factor,
            hasher,
        }
    }

    /// Build the final `ChainedHashMap`.
    pub fn build<K: Hash + Eq, V>(self) -> Result<ChainedHashMap<K, V, S>> {
        if !(self.max_load_factor > 0.0 && self.max_load_factor.is_finite()) {
            return Err(Error::InvalidInput(format!(
                "load factor must be a positive number, got {}",
                self.max_load_factor
            )));
        }
        Ok(ChainedHashMap::from_parts(
            self.capacity,
            self.max_load_factor,
            self.hasher,
        ))
    }
}

impl<K: Hash + Eq, V> ChainedHashMap<K, V> {
    /// Creates a new map with default capacity and default hasher.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_INITIAL_CAPACITY)
    }

    /// Creates a new map with a specified initial bucket count and default hasher.
    pub fn with_capacity(cap: usize) -> Self {
        ChainedHashMap::from_parts(cap.max(1), DEFAULT_MAX_LOAD_FACTOR, RandomState::new())
    }
}

impl<K: Hash + Eq, V> Default for ChainedHashMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> ChainedHashMap<K, V, S> {
    fn from_parts(bucket_count: usize, max_load_factor: f64, build_hasher: S) -> Self {
        ChainedHashMap {
            buckets: (0..bucket_count).map(|_| DLinkedList::new()).collect(),
            len: 0,
            max_load_factor,
            build_hasher,
        }
    }

    /// Returns the number of key-value pairs in the map.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Inserts a key-value pair into the map.
    /// If the key already exists, its value is replaced and the old value returned.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let idx = self.bucket_index(&key);
        if let Some(entry) = self.buckets[idx].find_mut(&key) {
            return Some(std::mem::replace(&mut entry.1, value));
        }

        if (self.len + 1) as f64 / self.buckets.len() as f64 > self.max_load_factor {
            self.resize();
        }
        let idx = self.bucket_index(&key);
        self.buckets[idx].push_front((key, value));
        self.len += 1;
        None
    }

    /// Returns a reference to the value corresponding to the key, if present.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.buckets[self.bucket_index(key)]
            .find(key)
            .map(|(_, v)| v)
    }

    /// Returns a mutable reference to the value corresponding to the key, if present.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let idx = self.bucket_index(key);
        self.buckets[idx].find_mut(key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Removes and returns the value for the specified key, if present.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = self.bucket_index(key);
        let (_, value) = self.buckets[idx].remove(key)?;
        self.len -= 1;
        Some(value)
    }

    /// Clears the map, removing all key-value pairs.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.len = 0;
    }

    /// Returns an iterator over the key-value pairs in the map.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.buckets
            .iter()
            .flat_map(|bucket| bucket.iter().map(|(k, v)| (k, v)))
    }

    /// Length of the longest chain.
    pub fn longest_chain(&self) -> usize {
        self.buckets.iter().map(DLinkedList::len).max().unwrap_or(0)
    }

    fn bucket_index(&self, key: &K) -> usize {
        multiplicative_index(base_hash(key, &self.build_hasher), self.buckets.len())
    }

    /// Double the number of buckets and re-chain existing entries.
    fn resize(&mut self) {
        let new_bucket_count = self.buckets.len() * 2;
        let mut new_buckets: Vec<DLinkedList<K, V>> =
            (0..new_bucket_count).map(|_| DLinkedList::new()).collect();

        for mut bucket in self.buckets.drain(..) {
            while let Some((k, v)) = bucket.pop_front() {
                let h = base_hash(&k, &self.build_hasher);
                new_buckets[multiplicative_index(h, new_bucket_count)].push_back((k, v));
            }
        }
        debug!(
            "chained map resized to {} buckets ({} entries)",
            new_bucket_count, self.len
        );
        self.buckets = new_buckets;
    }
}

/// `floor(m * frac(h * A))`: the top bits of `h * A mod 2^64`, scaled to `[0, m)`.
fn multiplicative_index(h: u64, m: usize) -> usize {
    let frac = h.wrapping_mul(KNUTH_MULTIPLIER);
    ((frac as u128 * m as u128) >> 64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cs::hashing::fnv::FnvBuildHasher;

    #[test]
    fn basic_insert_get_remove() {
        let mut map = ChainedHashMap::with_capacity(4);
        assert_eq!(map.len(), 0);
        assert!(map.is_empty());

        // Insert
        let old = map.insert("foo", 123);
        assert_eq!(old, None);
        assert_eq!(map.len(), 1);
        assert!(!map.is_empty());

        // Insert second
        let old = map.insert("bar", 999);
        assert_eq!(old, None);
        assert_eq!(map.len(), 2);

        // Insert existing
        let old = map.insert("foo", 456);
        assert_eq!(old, Some(123));
        assert_eq!(map.len(), 2);

        assert_eq!(map.get(&"foo"), Some(&456));
        assert_eq!(map.get(&"bar"), Some(&999));
        assert_eq!(map.get(&"baz"), None);

        let rm = map.remove(&"bar");
        assert_eq!(rm, Some(999));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&"bar"), None);
        assert_eq!(map.remove(&"bar"), None);
    }

    #[test]
    fn test_resize() {
        let mut map = ChainedHashMap::with_capacity(2);
        for i in 0..100 {
            map.insert(format!("key{}", i), i);
        }
        assert!(map.bucket_count() >= 128);
        for i in 0..100 {
            assert_eq!(map.get(&format!("key{}", i)), Some(&i));
        }
    }

    #[test]
    fn test_iter_and_clear() {
        let mut map = ChainedHashMap::new();
        map.insert("one", 1);
        map.insert("two", 2);
        map.insert("three", 3);

        let mut items: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
        items.sort_by_key(|x| x.0);
        assert_eq!(items, vec![("one", 1), ("three", 3), ("two", 2)]);

        *map.get_mut(&"two").unwrap() = 22;
        assert_eq!(map.get(&"two"), Some(&22));

        map.clear();
        assert!(map.is_empty());
        assert!(!map.contains_key(&"one"));
    }

    #[test]
    fn test_deterministic_hasher_and_chains() {
        let mut map = ChainedHashMapBuilder::new()
            .with_capacity(1)
            .with_max_load_factor(100.0)
            .with_hasher(FnvBuildHasher::default())
            .build()
            .unwrap();
        for i in 0..50u32 {
            map.insert(i, i * 2);
        }
        // everything shares the single bucket
        assert_eq!(map.bucket_count(), 1);
        assert_eq!(map.longest_chain(), 50);
        assert_eq!(map.remove(&25), Some(50));
        assert_eq!(map.get(&26), Some(&52));
        assert_eq!(map.len(), 49);
    }

    #[test]
    fn test_invalid_load_factor() {
        let result = ChainedHashMapBuilder::new()
            .with_max_load_factor(0.0)
            .build::<u8, u8>();
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_multiplicative_index_range() {
        for m in [1usize, 3, 32, 1000] {
            for h in [0u64, 1, 12345, u64::MAX] {
                assert!(multiplicative_index(h, m) < m);
            }
        }
        // consecutive hashes spread out instead of landing in adjacent buckets
        let a = multiplicative_index(1, 1024);
        let b = multiplicative_index(2, 1024);
        assert_ne!(a + 1, b);
    }
}
