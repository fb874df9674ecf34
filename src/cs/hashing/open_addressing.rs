//! # Open Addressing Hash Table (double hashing)
//!
//! This module provides a **HashMap** using *open addressing* with **double hashing**: all
//! entries live in one contiguous slot array and a collision is resolved by probing
//!
//! ```text
//!   idx_i = (h1(k) + i * step(k)) mod m,    step(k) = (1 + 2 * h2(k)) mod m
//! ```
//!
//! The capacity `m` is a power of two and `step` is always odd, so the probe sequence of
//! every key visits every slot exactly once.
//!
//! ## Key Features
//! - **Generic** key-value pairs (`K: Hash + Eq, V`) with two independent `BuildHasher`s.
//! - **Automatic Growth**: if the load factor is exceeded, the table doubles and rehashes.
//! - **Tombstones**: removal leaves a marker so probes continue past it; inserts reuse them,
//!   and too many tombstones trigger an in-place rehash.
//!
//! **Note**: not thread-safe; wrap in a lock for shared use.

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash};

use log::debug;

use super::universal::base_hash;
use crate::error::{Error, Result};

/// Default initial capacity if unspecified.
const DEFAULT_INITIAL_CAPACITY: usize = 32;
/// Default maximum load factor.
const DEFAULT_MAX_LOAD_FACTOR: f64 = 0.75;
/// Default threshold of tombstones vs. capacity to trigger rehash, e.g. 0.2 => if tombstones exceed 20% we rehash.
const DEFAULT_TOMBSTONE_THRESHOLD: f64 = 0.2;

/// An entry can be `Empty`, `Tombstone` (used to be occupied but removed), or `Occupied(key, value)`.
#[derive(Debug, Clone)]
enum Slot<K, V> {
    Empty,
    Tombstone,
    Occupied(K, V),
}

/// A builder for the `DoubleHashingMap`.
#[derive(Debug, Clone)]
pub struct DoubleHashingBuilder<S1, S2> {
    capacity: usize,
    max_load_factor: f64,
    tombstone_threshold: f64,
    hasher1: S1,
    hasher2: S2,
}

impl Default for DoubleHashingBuilder<RandomState, RandomState> {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_INITIAL_CAPACITY,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
            tombstone_threshold: DEFAULT_TOMBSTONE_THRESHOLD,
            hasher1: RandomState::new(),
            hasher2: RandomState::new(),
        }
    }
}

impl DoubleHashingBuilder<RandomState, RandomState> {
    /// Create a new builder with default parameters and two independent RandomState hashers.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S1: BuildHasher, S2: BuildHasher> DoubleHashingBuilder<S1, S2> {
    /// Sets initial capacity (will be rounded up to next power of two).
    pub fn with_capacity(mut self, cap: usize) -> Self {
        self.capacity = cap.max(1);
        self
    }

    /// Sets the maximum load factor, in `(0, 1)`.
    pub fn with_max_load_factor(mut self, lf: f64) -> Self {
        self.max_load_factor = lf;
        self
    }

    /// Sets tombstone threshold ratio, in `[0, 1)`.
    pub fn with_tombstone_threshold(mut self, ratio: f64) -> Self {
        self.tombstone_threshold = ratio;
        self
    }

    /// Hashers for the start slot (`h1`) and the probe step (`h2`).
    pub fn with_hashers<T1: BuildHasher, T2: BuildHasher>(
        self,
        hasher1: T1,
        hasher2: T2,
    ) -> DoubleHashingBuilder<T1, T2> {
        DoubleHashingBuilder {
            capacity: self.capacity,
            max_load_factor: self.max_load_factor,
            tombstone_threshold: self.tombstone_threshold,
            hasher1,
            hasher2,
        }
    }

    /// Validates the parameters and builds an empty map.
    pub fn build<K: Hash + Eq, V>(self) -> Result<DoubleHashingMap<K, V, S1, S2>> {
        if !(self.max_load_factor > 0.0 && self.max_load_factor < 1.0) {
            return Err(Error::InvalidInput(format!(
                "load factor must be in (0,1), got {}",
                self.max_load_factor
            )));
        }
        if !(self.tombstone_threshold >= 0.0 && self.tombstone_threshold < 1.0) {
            return Err(Error::InvalidInput(format!(
                "tombstone threshold must be in [0,1), got {}",
                self.tombstone_threshold
            )));
        }
        Ok(DoubleHashingMap::from_parts(
            self.capacity.next_power_of_two(),
            self.max_load_factor,
            self.tombstone_threshold,
            self.hasher1,
            self.hasher2,
        ))
    }
}

/// Open addressing hash map resolving collisions by double hashing.
#[derive(Debug, Clone)]
pub struct DoubleHashingMap<K, V, S1 = RandomState, S2 = RandomState> {
    slots: Vec<Slot<K, V>>,
    len: usize,
    tombstones: usize,
    max_load_factor: f64,
    tombstone_threshold: f64,
    hasher1: S1,
    hasher2: S2,
}

impl<K: Hash + Eq, V> DoubleHashingMap<K, V> {
    /// Creates a new map with default parameters.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_INITIAL_CAPACITY)
    }

    /// Creates with given capacity (rounded up to a power of two).
    pub fn with_capacity(cap: usize) -> Self {
        Self::from_parts(
            cap.max(1).next_power_of_two(),
            DEFAULT_MAX_LOAD_FACTOR,
            DEFAULT_TOMBSTONE_THRESHOLD,
            RandomState::new(),
            RandomState::new(),
        )
    }
}

impl<K: Hash + Eq, V> Default for DoubleHashingMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq, V, S1: BuildHasher, S2: BuildHasher> DoubleHashingMap<K, V, S1, S2> {
    fn from_parts(
        capacity: usize,
        max_load_factor: f64,
        tombstone_threshold: f64,
        hasher1: S1,
        hasher2: S2,
    ) -> Self {
        DoubleHashingMap {
            slots: (0..capacity).map(|_| Slot::Empty).collect(),
            len: 0,
            tombstones: 0,
            max_load_factor,
            tombstone_threshold,
            hasher1,
            hasher2,
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

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Insert a key-value pair. Returns the old value if the key existed.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(idx) = self.find_slot(&key) {
            if let Slot::Occupied(_, v) = &mut self.slots[idx] {
                return Some(std::mem::replace(v, value));
            }
        }

        let cap = self.capacity() as f64;
        if (self.len + 1) as f64 > self.max_load_factor * cap {
            self.rehash(self.capacity() * 2);
        } else if self.tombstones as f64 > self.tombstone_threshold * cap {
            self.rehash(self.capacity());
        }
        self.place(key, value);
        None
    }

    /// Retrieve a reference to the value for `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        match &self.slots[self.find_slot(key)?] {
            Slot::Occupied(_, v) => Some(v),
            _ => None,
        }
    }

    /// Retrieve a mutable reference to the value for `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let idx = self.find_slot(key)?;
        match &mut self.slots[idx] {
            Slot::Occupied(_, v) => Some(v),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.find_slot(key).is_some()
    }

    /// Removes key from the table, returning the old value if present.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = self.find_slot(key)?;
        match std::mem::replace(&mut self.slots[idx], Slot::Tombstone) {
            Slot::Occupied(_, v) => {
                self.len -= 1;
                self.tombstones += 1;
                Some(v)
            }
            other => {
                self.slots[idx] = other;
                None
            }
        }
    }

    /// Clears the table of all key-value pairs.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = Slot::Empty;
        }
        self.len = 0;
        self.tombstones = 0;
    }

    /// Returns an iterator over all (key, value) pairs in the table.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Occupied(k, v) => Some((k, v)),
            _ => None,
        })
    }

    /// Start slot and odd step of `key`'s probe sequence.
    fn probe(&self, key: &K) -> (usize, usize) {
        let mask = self.capacity() - 1;
        let h1 = base_hash(key, &self.hasher1) as usize;
        let h2 = base_hash(key, &self.hasher2) as usize;
        (h1 & mask, h2.wrapping_mul(2).wrapping_add(1) & mask)
    }

    /// Slot holding `key`, if any.
    fn find_slot(&self, key: &K) -> Option<usize> {
        let mask = self.capacity() - 1;
        let (start, step) = self.probe(key);
        for i in 0..self.capacity() {
            let idx = start.wrapping_add(i.wrapping_mul(step)) & mask;
            match &self.slots[idx] {
                Slot::Empty => return None,
                Slot::Occupied(k, _) if k == key => return Some(idx),
                _ => {}
            }
        }
        None
    }

    /// Puts a key known to be absent into the first free slot of its probe sequence.
    fn place(&mut self, key: K, value: V) {
        let mask = self.capacity() - 1;
        let (start, step) = self.probe(&key);
        for i in 0..self.capacity() {
            let idx = start.wrapping_add(i.wrapping_mul(step)) & mask;
            match self.slots[idx] {
                Slot::Empty => {}
                Slot::Tombstone => self.tombstones -= 1,
                Slot::Occupied(..) => continue,
            }
            self.slots[idx] = Slot::Occupied(key, value);
            self.len += 1;
            return;
        }
        // only reachable with a load factor of 1; make room and retry
        self.rehash(self.capacity() * 2);
        self.place(key, value);
    }

    /// Rebuild the table with new capacity, re-inserting all Occupied slots.
    fn rehash(&mut self, new_cap: usize) {
        let fresh = (0..new_cap).map(|_| Slot::Empty).collect();
        let old_slots = std::mem::replace(&mut self.slots, fresh);
        self.len = 0;
        self.tombstones = 0;
        debug!("double hashing map rehashed into {} slots", new_cap);

        for slot in old_slots {
            if let Slot::Occupied(k, v) = slot {
                self.place(k, v);
            }
        }
    }
}
