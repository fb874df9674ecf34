//! # Perfect Hashing
//!
//! This module implements **two-level perfect hashing** (the FKS scheme) for a static set of
//! distinct keys. Once built, lookups for those keys take `O(1)` time in the worst case: one
//! primary hash, one secondary hash, one equality check.
//!
//! ## Overview of the Algorithm
//!
//! 1. **Primary routing**: every key goes to bucket `base(k) mod n`, where `n` is the number
//!    of keys and `base` is a deterministic hash (FNV-1a by default). Routing never changes
//!    after construction.
//!
//! 2. **Secondary tables**: a bucket that received `c` keys gets a private table of `c²`
//!    cells and its own randomly drawn member of a [universal family](super::universal).
//!    For such a table the expected number of colliding pairs is below `1/2`, so we simply
//!    redraw the bucket's parameters until its keys land in distinct cells. The expected
//!    total size `Σ c²` is linear in `n`.
//!
//! 3. **Storage**: construction only fixes the layout. Values are stored by
//!    [`insert`](PerfectHashMap::insert); cells start empty.
//!
//! Keys outside the construction set still get routed somewhere, but nothing keeps them
//! apart from the keys that were planned for. Searches compare the stored key, so a foreign
//! key never reads a neighbour's value; inserting one fails whenever its cell is taken.
//! The only way to grow is to rebuild with the larger key set
//! ([`rebuild_with`](PerfectHashMap::rebuild_with)).
//!
//! ## Example
//!
//! ```rust
//! use hashtables::cs::hashing::perfect::PerfectHashMapBuilder;
//!
//! let keys = vec!["apple", "banana", "cherry"];
//! let mut map = PerfectHashMapBuilder::new().with_seed(42).build(keys).unwrap();
//!
//! assert!(map.insert("apple", 1));
//! assert!(map.insert("banana", 2));
//! assert_eq!(map.get(&"apple"), Some(&1));
//! assert_eq!(map.get(&"cherry"), None);
//!
//! assert_eq!(map.erase(&"apple"), Some(1));
//! assert_eq!(map.get(&"apple"), None);
//! ```

use std::collections::HashSet;
use std::fmt;
use std::hash::{BuildHasher, Hash};

use log::{debug, trace, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use super::fnv::FnvBuildHasher;
use super::universal::{base_hash, validate_prime, UniversalHash, PRIME_61};
use crate::error::{Error, Result};

/// Default cap on secondary-hash draws per bucket. Each draw succeeds with probability
/// above one half, so hitting the cap means the hash family is broken.
pub const DEFAULT_MAX_ATTEMPTS: usize = 1000;

/// One primary bucket: its construction keys, its secondary function and `c²` cells.
#[derive(Debug, Clone)]
struct Bucket<K, V> {
    cells: Vec<Option<(K, V)>>,
    hash: UniversalHash,
    keys: Vec<K>,
    retries: usize,
}

/// Configuration for a [`PerfectHashMap`].
#[derive(Debug, Clone)]
pub struct PerfectHashMapBuilder<S> {
    hasher: S,
    seed: Option<u64>,
    max_attempts: usize,
    prime: u64,
}

impl Default for PerfectHashMapBuilder<FnvBuildHasher> {
    fn default() -> Self {
        Self {
            hasher: FnvBuildHasher::default(),
            seed: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            prime: PRIME_61,
        }
    }
}

impl PerfectHashMapBuilder<FnvBuildHasher> {
    /// FNV-1a base hash, entropy-seeded secondary parameters, default retry cap.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: BuildHasher> PerfectHashMapBuilder<S> {
    /// Seeds the RNG that draws secondary hash parameters, making construction reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Maximum number of secondary-hash draws per bucket.
    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Prime modulus of the secondary hash family.
    pub fn with_prime(mut self, prime: u64) -> Self {
        self.prime = prime;
        self
    }

    /// Replaces the base hasher used for primary routing and as input to the secondary hashes.
    pub fn with_hasher<T: BuildHasher>(self, hasher: T) -> PerfectHashMapBuilder<T> {
        PerfectHashMapBuilder {
            hasher,
            seed: self.seed,
            max_attempts: self.max_attempts,
            prime: self.prime,
        }
    }

    /// Builds the table layout for `keys`, which must be free of duplicates.
    pub fn build<K, V, I>(self, keys: I) -> Result<PerfectHashMap<K, V, S>>
    where
        K: Hash + Eq,
        I: IntoIterator<Item = K>,
    {
        if self.max_attempts == 0 {
            return Err(Error::InvalidInput(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        let prime = validate_prime(self.prime)?;
        let rng = match self.seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_entropy(),
        };
        PerfectHashMap::construct(
            keys.into_iter().collect(),
            self.hasher,
            rng,
            prime,
            self.max_attempts,
        )
    }
}

/// A static two-level perfect hash map.
///
/// See the [module documentation](self) for the construction.
#[derive(Debug, Clone)]
pub struct PerfectHashMap<K, V, S = FnvBuildHasher> {
    buckets: Vec<Bucket<K, V>>,
    hasher: S,
    /// Occupied cells.
    len: usize,
    duplicate_inserts: usize,
    rng: ChaCha20Rng,
    prime: u64,
    max_attempts: usize,
}

impl<K: Hash + Eq, V> PerfectHashMap<K, V> {
    /// Builds a map for `keys` with the default configuration.
    pub fn new<I: IntoIterator<Item = K>>(keys: I) -> Result<Self> {
        PerfectHashMapBuilder::new().build(keys)
    }
}

impl<K, V, S> PerfectHashMap<K, V, S> {
    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of primary buckets, equal to the size of the construction key set.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Secondary table size of bucket `index` (the square of its key count).
    pub fn bucket_capacity(&self, index: usize) -> Option<usize> {
        self.buckets.get(index).map(|b| b.cells.len())
    }

    /// Total number of cells over all buckets.
    pub fn total_capacity(&self) -> usize {
        self.buckets.iter().map(|b| b.cells.len()).sum()
    }

    /// How many times bucket `index` redrew its secondary hash during construction.
    pub fn bucket_retries(&self, index: usize) -> Option<usize> {
        self.buckets.get(index).map(|b| b.retries)
    }

    /// Number of inserts rejected because the key was already stored.
    pub fn duplicate_inserts(&self) -> usize {
        self.duplicate_inserts
    }

    /// The construction key set, in bucket order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.buckets.iter().flat_map(|b| b.keys.iter())
    }

    /// Stored entries in bucket-then-cell order. Call again to restart.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.buckets.iter().flat_map(|bucket| {
            bucket
                .cells
                .iter()
                .filter_map(|cell| cell.as_ref().map(|(k, v)| (k, v)))
        })
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> PerfectHashMap<K, V, S> {
    fn construct(
        keys: Vec<K>,
        hasher: S,
        mut rng: ChaCha20Rng,
        prime: u64,
        max_attempts: usize,
    ) -> Result<Self> {
        let n = keys.len();
        let mut partition: Vec<Vec<(u64, K)>> = (0..n).map(|_| Vec::new()).collect();
        for key in keys {
            let h = base_hash(&key, &hasher);
            partition[(h % n as u64) as usize].push((h, key));
        }

        let mut buckets = Vec::with_capacity(n);
        let mut total_retries = 0;
        for (index, entries) in partition.into_iter().enumerate() {
            let bucket = build_bucket(index, entries, prime, max_attempts, &mut rng)?;
            total_retries += bucket.retries;
            buckets.push(bucket);
        }

        let map = PerfectHashMap {
            buckets,
            hasher,
            len: 0,
            duplicate_inserts: 0,
            rng,
            prime,
            max_attempts,
        };
        debug!(
            "perfect hash map built: {} keys, {} cells, {} secondary redraws",
            n,
            map.total_capacity(),
            total_retries
        );
        Ok(map)
    }

    /// Primary bucket of `key`, or `None` for a table without buckets.
    pub fn bucket_index(&self, key: &K) -> Option<usize> {
        if self.buckets.is_empty() {
            return None;
        }
        let h = base_hash(key, &self.hasher);
        Some((h % self.buckets.len() as u64) as usize)
    }

    /// `(bucket, cell)` the key resolves to. `None` when its bucket has no cells.
    pub fn locate(&self, key: &K) -> Option<(usize, usize)> {
        if self.buckets.is_empty() {
            return None;
        }
        let h = base_hash(key, &self.hasher);
        let b = (h % self.buckets.len() as u64) as usize;
        let bucket = &self.buckets[b];
        if bucket.cells.is_empty() {
            return None;
        }
        Some((b, bucket.hash.slot(h, bucket.cells.len())))
    }

    /// Whether `key` was part of the construction key set.
    pub fn in_key_set(&self, key: &K) -> bool {
        self.bucket_index(key)
            .is_some_and(|b| self.buckets[b].keys.contains(key))
    }

    /// Stores `(key, value)` in the key's cell.
    ///
    /// Fails with [`Error::KeyExists`] if the key is already stored (the rejection is
    /// counted in [`duplicate_inserts`](Self::duplicate_inserts)) and with
    /// [`Error::CapacityExceeded`] if the cell holds another key or the key has no cell.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<()> {
        let (b, c) = self.locate(&key).ok_or(Error::CapacityExceeded)?;
        let cell = &mut self.buckets[b].cells[c];
        if let Some((stored, _)) = cell {
            if *stored == key {
                self.duplicate_inserts += 1;
                return Err(Error::KeyExists);
            }
            return Err(Error::CapacityExceeded);
        }
        *cell = Some((key, value));
        self.len += 1;
        Ok(())
    }

    /// [`try_insert`](Self::try_insert) reporting only success.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        self.try_insert(key, value).is_ok()
    }

    /// The stored entry for `key`.
    pub fn search(&self, key: &K) -> Option<(&K, &V)> {
        let (b, c) = self.locate(key)?;
        match &self.buckets[b].cells[c] {
            Some((k, v)) if k == key => Some((k, v)),
            _ => None,
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.search(key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let (b, c) = self.locate(key)?;
        match &mut self.buckets[b].cells[c] {
            Some((k, v)) if *k == *key => Some(v),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.search(key).is_some()
    }

    /// Removes `key`'s entry. A no-op returning `None` if the key is not stored.
    pub fn erase(&mut self, key: &K) -> Option<V> {
        let (b, c) = self.locate(key)?;
        let cell = &mut self.buckets[b].cells[c];
        if !matches!(cell.as_ref(), Some((k, _)) if k == key) {
            return None;
        }
        let (_, value) = cell.take()?;
        self.len -= 1;
        Some(value)
    }
}

impl<K: Hash + Eq + Clone, V, S: BuildHasher + Clone> PerfectHashMap<K, V, S> {
    /// Rebuilds the table for the current key set plus `extra`, keeping every stored entry.
    ///
    /// Keys that are already planned for or stored are skipped, as are repeats within
    /// `extra`. The base hasher, prime and retry cap carry over, and the RNG stream
    /// continues, so a seeded table rebuilds reproducibly.
    ///
    /// On error the table is left exactly as it was.
    pub fn rebuild_with<I: IntoIterator<Item = K>>(&mut self, extra: I) -> Result<()> {
        let mut keys: Vec<K> = Vec::new();
        for bucket in &self.buckets {
            keys.extend(bucket.keys.iter().cloned());
            // foreign keys that found a free cell must be planned for too
            for (k, _) in bucket.cells.iter().flatten() {
                if !bucket.keys.contains(k) {
                    keys.push(k.clone());
                }
            }
        }
        let mut seen: HashSet<K> = keys.iter().cloned().collect();
        for k in extra {
            if !seen.contains(&k) {
                seen.insert(k.clone());
                keys.push(k);
            }
        }

        let mut map = Self::construct(
            keys,
            self.hasher.clone(),
            self.rng.clone(),
            self.prime,
            self.max_attempts,
        )?;
        map.duplicate_inserts = self.duplicate_inserts;

        // every stored key is planned for, so each lands in its own empty cell
        for bucket in &mut self.buckets {
            for cell in &mut bucket.cells {
                if let Some((k, v)) = cell.take() {
                    map.try_insert(k, v)?;
                }
            }
        }
        *self = map;
        Ok(())
    }
}

/// Prints one `key value` line per stored entry, in iteration order.
impl<K: fmt::Display, V: fmt::Display, S> fmt::Display for PerfectHashMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (k, v) in self.iter() {
            writeln!(f, "{} {}", k, v)?;
        }
        Ok(())
    }
}

/// Sizes bucket `index` and draws secondary parameters until its keys are collision-free.
fn build_bucket<K: Eq, V, R: Rng>(
    index: usize,
    entries: Vec<(u64, K)>,
    prime: u64,
    max_attempts: usize,
    rng: &mut R,
) -> Result<Bucket<K, V>> {
    let (hashes, keys): (Vec<u64>, Vec<K>) = entries.into_iter().unzip();
    let c = keys.len();
    let capacity = c * c;
    let mut hash = UniversalHash::random(prime, rng);
    let mut retries = 0;

    // zero or one key cannot collide
    if c > 1 {
        for i in 0..c {
            for j in i + 1..c {
                if keys[i] == keys[j] {
                    return Err(Error::DuplicateKey { bucket: index });
                }
                if hashes[i] % prime == hashes[j] % prime {
                    return Err(Error::IndistinguishableKeys { bucket: index });
                }
            }
        }

        let mut attempts = 1;
        while !hash.is_collision_free(&hashes, capacity) {
            if attempts >= max_attempts {
                warn!(
                    "bucket {} ({} keys): no collision-free secondary hash after {} attempts",
                    index, c, attempts
                );
                return Err(Error::RetryLimitExceeded {
                    bucket: index,
                    attempts,
                });
            }
            hash.regenerate(rng);
            attempts += 1;
            trace!("bucket {}: secondary hash redraw #{}", index, attempts - 1);
        }
        retries = attempts - 1;
    }

    Ok(Bucket {
        cells: (0..capacity).map(|_| None).collect(),
        hash,
        keys,
        retries,
    })
}
