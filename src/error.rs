//! Error types for chunktree

use thiserror::Error;

/// Result type alias for chunktree operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, encoding or reading trees
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid tree array: {0}")]
    Format(String),

    #[error("Range out of bounds: requested {start}-{end} in data of size {len}")]
    OutOfBounds { start: usize, end: usize, len: usize },

    #[error("Leaf array full: {capacity} slots already submitted")]
    CapacityExceeded { capacity: usize },

    #[error("Hash worker failed: {0}")]
    Worker(String),

    #[error("Config error: {0}")]
    Config(String),
}
