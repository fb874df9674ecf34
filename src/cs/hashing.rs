//! Hash table implementations.
//!
//! This module provides hash tables built on different collision-resolution strategies:
//! - Static two-level perfect hashing (`perfect`), with a lock-guarded wrapper (`shared`)
//! - Open addressing with double hashing (`open_addressing`)
//! - Separate chaining over doubly linked lists (`separate`, `linked_list`)
//!
//! and the hash functions they are built from:
//! - A universal hash family over a prime field (`universal`)
//! - FNV-1a as a deterministic base hash (`fnv`)
//!
//! # Examples
//!
//! ```rust
//! use hashtables::hashing::{ChainedHashMap, PerfectHashMap};
//!
//! let mut planned = PerfectHashMap::new(vec!["red", "green", "blue"]).unwrap();
//! assert!(planned.insert("green", 2));
//! assert_eq!(planned.get(&"green"), Some(&2));
//!
//! let mut chained = ChainedHashMap::new();
//! chained.insert("violet", 7);
//! assert_eq!(chained.get(&"violet"), Some(&7));
//! ```

pub mod fnv;
pub mod linked_list;
pub mod open_addressing;
pub mod perfect;
pub mod separate;
pub mod shared;
pub mod universal;

pub use fnv::{FnvBuildHasher, FnvBuilder, FnvVariant};
pub use linked_list::DLinkedList;
pub use open_addressing::{DoubleHashingBuilder, DoubleHashingMap};
pub use perfect::{PerfectHashMap, PerfectHashMapBuilder};
pub use separate::{ChainedHashMap, ChainedHashMapBuilder};
pub use shared::SharedPerfectHashMap;
pub use universal::{UniversalHash, UniversalHashBuilder};
