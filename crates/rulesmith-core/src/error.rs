//! Error types for rulesmith-core
//!
//! Only structural failures live here. Per-rule and per-artifact problems
//! are reported as [`crate::Warning`] values and never abort a batch.

use std::path::PathBuf;

/// Result type for rulesmith-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a whole operation
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An origin root exists but cannot be walked or read
    #[error("Cannot read {origin} root at {root}: {message}")]
    Resolution {
        origin: String,
        root: PathBuf,
        message: String,
    },

    /// The ledger exists but cannot be read, locked or parsed
    #[error("Cannot read ledger at {path}: {message}")]
    LedgerRead { path: PathBuf, message: String },

    /// The ledger could not be written back
    #[error("Cannot write ledger at {path}: {message}")]
    LedgerWrite { path: PathBuf, message: String },

    /// A requested rule identifier was not resolved from any origin
    #[error("Unknown rule: {id}")]
    UnknownRule { id: String },

    /// Operation options are inconsistent
    #[error("Invalid options: {message}")]
    InvalidOptions { message: String },

    /// The global scope root could not be determined
    #[error("No home directory available for global installs")]
    NoHomeDirectory,

    // Transparent wrappers for underlying crate errors
    #[error(transparent)]
    Fs(#[from] rulesmith_fs::Error),

    #[error(transparent)]
    Meta(#[from] rulesmith_meta::Error),

    #[error(transparent)]
    Targets(#[from] rulesmith_targets::Error),
}
