use std::collections::TryReserveError;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Read lookup of a key that is not in the map.
    #[error("key not found")]
    NotFound,
    /// Growing the key index or the value store failed. The map is unchanged.
    #[error("failed to grow map storage: {0}")]
    AllocationFailed(#[from] TryReserveError),
    /// A parallel key/value batch had sequences of different lengths.
    #[error("length mismatch: {keys} keys but {values} values")]
    LengthMismatch { keys: usize, values: usize },
}
