//! Conf codec error types

use thiserror::Error;

/// Result type for tellstick-conf operations
pub type Result<T> = std::result::Result<T, ConfError>;

#[derive(Debug, Error)]
pub enum ConfError {
    /// File could not be read or written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File content does not fit the restricted conf grammar
    #[error("Parse error: {0}")]
    Parse(String),
}
