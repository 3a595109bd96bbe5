//! Error types for katzestore

use std::io;

/// Result type alias for katzestore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for store operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Store file exists but is not a JSON object of slots
    #[error("Parse error: {0}")]
    Parse(String),

    /// Value could not be serialized into a slot
    #[error("Serialize error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Store is closed
    #[error("Store is closed")]
    Closed,
}
