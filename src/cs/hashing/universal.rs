//! # Universal Hashing
//!
//! A Carter–Wegman style **universal hash family** over a prime field:
//!
//! ```text
//!   h_{a,b}(k) = (a * base(k) + b) mod p,    a in [1, p-1], b in [0, p-1]
//! ```
//!
//! `base(k)` is a fixed, deterministic hash of the key (any `BuildHasher`). Drawing `(a, b)`
//! at random picks a random member of the family; for two distinct base values the chance
//! that they collide after reduction into a range of size `m` is about `1/m`. That bound is
//! what lets the perfect hash map find a collision-free secondary function for a bucket of
//! `c` keys in a table of `c²` cells after an expected constant number of redraws.
//!
//! The default modulus is the Mersenne prime `2^61 - 1`. Products are formed in 128 bits,
//! so no intermediate value overflows.
//!
//! # Usage
//!
//! ```rust
//! use hashtables::cs::hashing::universal::UniversalHashBuilder;
//!
//! let family = UniversalHashBuilder::new().seed(7).build().unwrap();
//! let h = family.evaluate(12345);
//! assert!(h < family.prime());
//!
//! // a = 1, b = 0 over p = 31 is the identity, which keeps 0..4 apart in 4 cells.
//! let identity = UniversalHashBuilder::new().prime(31).params(1, 0).build().unwrap();
//! assert!(identity.is_collision_free(&[0, 1, 2, 3], 4));
//! ```

use std::hash::{BuildHasher, Hash, Hasher};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::error::{Error, Result};

/// 2^61 - 1, a Mersenne prime ("M61").
pub const PRIME_61: u64 = 0x1FFFFFFFFFFFFFFF;

/// Builder for a single [`UniversalHash`].
#[derive(Debug, Clone)]
pub struct UniversalHashBuilder {
    seed: Option<u64>,
    a: Option<u64>,
    b: Option<u64>,
    p: u64,
}

impl Default for UniversalHashBuilder {
    fn default() -> Self {
        Self {
            seed: None,
            a: None,
            b: None,
            p: PRIME_61,
        }
    }
}

impl UniversalHashBuilder {
    /// Creates a new builder with the default prime (2^61-1) and random parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom prime modulus. Checked by [`build`](Self::build).
    pub fn prime(mut self, p: u64) -> Self {
        self.p = p;
        self
    }

    /// Sets an explicit seed for parameter generation.
    /// If not called, the parameters are drawn from an entropy-seeded RNG.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Provide your own parameters `a` and `b`, bypassing random generation.
    pub fn params(mut self, a: u64, b: u64) -> Self {
        self.a = Some(a);
        self.b = Some(b);
        self
    }

    /// Validates the configuration and builds the hash function.
    pub fn build(self) -> Result<UniversalHash> {
        let p = validate_prime(self.p)?;
        match (self.a, self.b) {
            (Some(a), Some(b)) => UniversalHash::with_params(p, a, b),
            (None, None) => {
                let mut rng = match self.seed {
                    Some(s) => ChaCha20Rng::seed_from_u64(s),
                    None => ChaCha20Rng::from_entropy(),
                };
                Ok(UniversalHash::random(p, &mut rng))
            }
            _ => Err(Error::InvalidInput(
                "both a and b must be given when fixing parameters".to_string(),
            )),
        }
    }
}

/// Checks that `p` can serve as the modulus of the family.
pub(crate) fn validate_prime(p: u64) -> Result<u64> {
    if p < 2 {
        return Err(Error::InvalidInput(format!("modulus {} must be > 1", p)));
    }
    if p >= 1 << 63 {
        return Err(Error::InvalidInput(format!(
            "modulus {} must be below 2^63",
            p
        )));
    }
    if !num_prime::nt_funcs::is_prime64(p) {
        return Err(Error::InvalidInput(format!("modulus {} is not prime", p)));
    }
    Ok(p)
}

/// One member `h_{a,b}` of the universal family modulo a prime `p`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniversalHash {
    p: u64,
    a: u64,
    b: u64,
}

impl UniversalHash {
    /// Draws a random member of the family modulo an already validated prime `p`.
    pub(crate) fn random<R: Rng + ?Sized>(p: u64, rng: &mut R) -> Self {
        let mut h = UniversalHash { p, a: 1, b: 0 };
        h.regenerate(rng);
        h
    }

    /// A fixed member of the family. `p` is checked like [`UniversalHashBuilder::prime`].
    pub fn with_params(p: u64, a: u64, b: u64) -> Result<Self> {
        let p = validate_prime(p)?;
        if a == 0 || a >= p {
            return Err(Error::InvalidInput(format!(
                "param a must be in [1..{}], got {}",
                p - 1,
                a
            )));
        }
        if b >= p {
            return Err(Error::InvalidInput(format!(
                "param b must be in [0..{}], got {}",
                p - 1,
                b
            )));
        }
        Ok(UniversalHash { p, a, b })
    }

    pub fn prime(&self) -> u64 {
        self.p
    }

    /// Current `(a, b)`.
    pub fn params(&self) -> (u64, u64) {
        (self.a, self.b)
    }

    /// Evaluates the function on a precomputed base hash. Result is in `[0, p)`.
    #[inline]
    pub fn evaluate(&self, base: u64) -> u64 {
        add_mod(mul_mod(self.a, base, self.p), self.b, self.p)
    }

    /// Hashes `key` with `build_hasher`, then evaluates.
    pub fn hash_key<K: Hash + ?Sized, S: BuildHasher>(&self, key: &K, build_hasher: &S) -> u64 {
        self.evaluate(base_hash(key, build_hasher))
    }

    /// Slot of a base hash in a table of `m` cells. `m` must be non-zero.
    #[inline]
    pub(crate) fn slot(&self, base: u64, m: usize) -> usize {
        (self.evaluate(base) % m as u64) as usize
    }

    /// Draws fresh `(a, b)`, `a` non-zero.
    pub fn regenerate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.a = rng.gen_range(1..self.p);
        self.b = rng.gen_range(0..self.p);
    }

    /// Reports whether every base hash lands in its own cell of a `target_size` table.
    pub fn is_collision_free(&self, base_hashes: &[u64], target_size: usize) -> bool {
        if target_size == 0 {
            return base_hashes.is_empty();
        }
        if base_hashes.len() > target_size {
            return false;
        }
        let mut taken = vec![false; target_size];
        for &h in base_hashes {
            let slot = self.slot(h, target_size);
            if taken[slot] {
                return false;
            }
            taken[slot] = true;
        }
        true
    }

    /// [`is_collision_free`](Self::is_collision_free) over keys rather than base hashes.
    pub fn is_collision_free_keys<K: Hash, S: BuildHasher>(
        &self,
        keys: &[K],
        target_size: usize,
        build_hasher: &S,
    ) -> bool {
        let hashes: Vec<u64> = keys.iter().map(|k| base_hash(k, build_hasher)).collect();
        self.is_collision_free(&hashes, target_size)
    }
}

/// The deterministic hash every family member is applied to.
#[inline]
pub(crate) fn base_hash<K: Hash + ?Sized, S: BuildHasher>(key: &K, build_hasher: &S) -> u64 {
    let mut hasher = build_hasher.build_hasher();
    key.hash(&mut hasher);
    hasher.finish()
}

// ---------- Low-level ops for mod p < 2^63 ---------- //

#[inline]
fn add_mod(x: u64, y: u64, p: u64) -> u64 {
    let x = x % p;
    let y = y % p;
    let s = x + y;
    if s >= p {
        s - p
    } else {
        s
    }
}

/// Multiplication mod p through a 128-bit product.
#[inline]
fn mul_mod(x: u64, y: u64, p: u64) -> u64 {
    let prod = (x as u128) * (y as u128);
    (prod % (p as u128)) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cs::hashing::fnv::FnvBuildHasher;

    #[test]
    fn test_fixed_params() {
        let uh = UniversalHashBuilder::new()
            .prime(31)
            .params(3, 5)
            .build()
            .unwrap();
        // (3 * 10 + 5) mod 31 = 4
        assert_eq!(uh.evaluate(10), 4);
        // base is reduced mod p first: 41 = 10 (mod 31)
        assert_eq!(uh.evaluate(41), 4);
        assert_eq!(uh.params(), (3, 5));
    }

    #[test]
    fn test_range_with_seed() {
        let uh = UniversalHashBuilder::new()
            .prime(31)
            .seed(12345)
            .build()
            .unwrap();
        for base in [0u64, 1, 30, 31, u64::MAX] {
            assert!(uh.evaluate(base) < 31);
        }
        let (a, b) = uh.params();
        assert!((1..31).contains(&a));
        assert!(b < 31);
    }

    #[test]
    fn test_seed_is_reproducible() {
        let x = UniversalHashBuilder::new().seed(99).build().unwrap();
        let y = UniversalHashBuilder::new().seed(99).build().unwrap();
        assert_eq!(x, y);
        assert_eq!(x.evaluate(u64::MAX), y.evaluate(u64::MAX));
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(matches!(
            UniversalHashBuilder::new().prime(1).build(),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            UniversalHashBuilder::new().prime(32).build(),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            UniversalHashBuilder::new().prime(31).params(0, 1).build(),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            UniversalHashBuilder::new().prime(31).params(1, 31).build(),
            Err(Error::InvalidInput(_))
        ));
        // moduli are checked on the direct constructor as well
        assert!(UniversalHash::with_params(0, 1, 0).is_err());
        assert!(UniversalHash::with_params(1, 1, 0).is_err());
        assert!(UniversalHash::with_params(33, 1, 0).is_err());
        assert!(UniversalHashBuilder::new()
            .prime(638_053_337)
            .build()
            .is_ok());
    }

    #[test]
    fn test_regenerate_changes_params() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let mut uh = UniversalHash::random(PRIME_61, &mut rng);
        let before = uh.params();
        uh.regenerate(&mut rng);
        assert_ne!(before, uh.params());
        let (a, b) = uh.params();
        assert!(a >= 1 && a < PRIME_61);
        assert!(b < PRIME_61);
    }

    #[test]
    fn test_collision_check() {
        // a = 1, b = 0 is the identity modulo p
        let id = UniversalHash::with_params(31, 1, 0).unwrap();
        assert!(id.is_collision_free(&[0, 1, 2, 3], 4));
        assert!(!id.is_collision_free(&[0, 4], 4));
        assert!(!id.is_collision_free(&[1, 2, 3], 2));
        assert!(id.is_collision_free(&[], 0));
        assert!(!id.is_collision_free(&[1], 0));
        assert!(id.is_collision_free(&[17], 1));
    }

    #[test]
    fn test_collision_check_over_keys() {
        let fnv = FnvBuildHasher::default();
        let mut rng = ChaCha20Rng::seed_from_u64(2024);
        let mut uh = UniversalHash::random(PRIME_61, &mut rng);
        let keys = ["x", "y", "z"];
        // Some member of the family separates three keys in nine cells.
        let mut found = false;
        for _ in 0..100 {
            if uh.is_collision_free_keys(&keys, 9, &fnv) {
                found = true;
                break;
            }
            uh.regenerate(&mut rng);
        }
        assert!(found);
        let slots: std::collections::HashSet<_> = keys
            .iter()
            .map(|k| (uh.hash_key(k, &fnv) % 9) as usize)
            .collect();
        assert_eq!(slots.len(), 3);
    }

    #[test]
    fn test_mul_mod_no_overflow() {
        let p = PRIME_61;
        assert_eq!(mul_mod(p - 1, p - 1, p), 1);
        assert_eq!(add_mod(p - 1, 1, p), 0);
    }
}
