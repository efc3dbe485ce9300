//! Error types for tree building and enumeration.

use thiserror::Error;

/// Result type alias for tree operations.
pub type Result<T> = std::result::Result<T, TreeError>;

/// Errors that can occur while working with a directory tree.
#[derive(Error, Debug)]
pub enum TreeError {
    /// The root the caller asked to operate on is missing or not a
    /// directory. Failures below the root are never fatal and are
    /// reported through logs and counters instead.
    #[error("root is not a usable directory: {0}")]
    RootUnusable(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
