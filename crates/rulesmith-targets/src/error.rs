//! Error types for rulesmith-targets

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unknown target: {slug}")]
    UnknownTarget { slug: String },

    #[error("Invalid target definition {slug}: {message}")]
    InvalidTarget { slug: String, message: String },

    #[error("Fragment '{name}' failed to register: {message}")]
    Fragment { name: String, message: String },

    #[error("Render failed for {rule}: {message}")]
    Render { rule: String, message: String },
}
