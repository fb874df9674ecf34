//! # FNV Base Hash
//!
//! A deterministic 64-bit FNV (Fowler–Noll–Vo) hasher used as the **base hash** of the
//! tables in this crate. Unlike `RandomState`, two `FnvBuildHasher`s with the same
//! configuration always agree, which keeps primary routing of the perfect hash map
//! reproducible across runs.
//!
//! - `FNV-1a` by default, `FNV-1` on request.
//! - An optional seed is folded into the offset basis, giving independent hash functions
//!   for structures that need two of them (e.g. double hashing).
//! - Implements `std::hash::{BuildHasher, Hasher}` so it plugs into any of the maps here.
//!
//! **Note**: FNV is not cryptographically secure and is trivially attackable with chosen
//! keys. Use it for fixed or trusted key sets.

use std::hash::{BuildHasher, Hasher};

const FNV64_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV64_PRIME: u64 = 0x100000001b3;

/// Which FNV variant: FNV1 or FNV1a.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FnvVariant {
    /// FNV-1: multiply, then xor.
    Fnv1,
    /// FNV-1a: xor, then multiply.
    #[default]
    Fnv1a,
}

/// Configures a [`FnvBuildHasher`].
#[derive(Debug, Clone, Default)]
pub struct FnvBuilder {
    variant: FnvVariant,
    seed: u64,
}

impl FnvBuilder {
    /// Create a new builder with default (FNV-1a, no seed).
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the variant: FNV-1 or FNV-1a.
    pub fn variant(mut self, variant: FnvVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Sets the seed mixed into the offset basis.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> FnvBuildHasher {
        FnvBuildHasher {
            variant: self.variant,
            basis: FNV64_OFFSET_BASIS ^ self.seed,
        }
    }
}

/// Deterministic `BuildHasher` producing [`FnvHasher`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FnvBuildHasher {
    variant: FnvVariant,
    basis: u64,
}

impl Default for FnvBuildHasher {
    fn default() -> Self {
        FnvBuilder::new().build()
    }
}

impl FnvBuildHasher {
    /// Shorthand for a seeded FNV-1a hasher.
    pub fn with_seed(seed: u64) -> Self {
        FnvBuilder::new().seed(seed).build()
    }
}

impl BuildHasher for FnvBuildHasher {
    type Hasher = FnvHasher;

    fn build_hasher(&self) -> Self::Hasher {
        FnvHasher {
            variant: self.variant,
            state: self.basis,
        }
    }
}

/// 64-bit FNV hasher state.
#[derive(Debug, Clone)]
pub struct FnvHasher {
    variant: FnvVariant,
    state: u64,
}

impl Hasher for FnvHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        match self.variant {
            FnvVariant::Fnv1 => {
                for &b in bytes {
                    self.state = self.state.wrapping_mul(FNV64_PRIME);
                    self.state ^= b as u64;
                }
            }
            FnvVariant::Fnv1a => {
                for &b in bytes {
                    self.state ^= b as u64;
                    self.state = self.state.wrapping_mul(FNV64_PRIME);
                }
            }
        }
    }
}

/// Returns a 64-bit FNV-1a hash of `data`.
pub fn fnv64a_hash(data: &[u8]) -> u64 {
    let mut h = FnvBuildHasher::default().build_hasher();
    h.write(data);
    h.finish()
}
