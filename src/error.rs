//! Error types shared by the hash table implementations.

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while configuring, building, or mutating a table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A builder was given an unusable parameter.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The construction key set contains the same key more than once.
    #[error("duplicate key in construction set (bucket {bucket})")]
    DuplicateKey { bucket: usize },

    /// Two distinct keys share a base hash, so no secondary hash can separate them.
    #[error("distinct keys share a base hash in bucket {bucket}; choose another base hasher")]
    IndistinguishableKeys { bucket: usize },

    /// No collision-free secondary hash was found within the retry budget.
    #[error("no collision-free secondary hash for bucket {bucket} after {attempts} attempts")]
    RetryLimitExceeded { bucket: usize, attempts: usize },

    /// The key already has an entry.
    #[error("key already present")]
    KeyExists,

    /// The key's cell holds another key (or the key has no cell at all).
    #[error("no free cell for key; rebuild the table with the key included")]
    CapacityExceeded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_bucket() {
        let err = Error::RetryLimitExceeded {
            bucket: 7,
            attempts: 3,
        };
        assert_eq!(
            err.to_string(),
            "no collision-free secondary hash for bucket 7 after 3 attempts"
        );
        assert!(Error::DuplicateKey { bucket: 2 }
            .to_string()
            .contains("bucket 2"));
    }
}
