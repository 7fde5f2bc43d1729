//! Filesystem primitives for rulesmith
//!
//! Provides normalized path handling, atomic writes, checksums and a
//! format-agnostic config store used by the higher layers.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;
pub mod path;

pub use checksum::{compute_content_checksum, compute_file_checksum};
pub use config::ConfigStore;
pub use error::{Error, Result};
pub use path::{NormalizedPath, validate_path_identifier};
