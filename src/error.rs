use thiserror::Error;

/// Unified error type for app-tagger operations
#[derive(Error, Debug)]
pub enum TaggerError {
    #[error("Invalid change_type: {0}. Must be 'major', 'minor', or 'patch'")]
    InvalidChangeType(String),

    #[error("Tag {0} already exists!")]
    TagExists(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version error: {0}")]
    Version(String),

    #[error("Source-control host error: {0}")]
    Host(String),

    #[error("Failed to create/push tag: {0}")]
    Publish(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in app-tagger
pub type Result<T> = std::result::Result<T, TaggerError>;

impl TaggerError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        TaggerError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        TaggerError::Version(msg.into())
    }

    /// Create a host error with context
    pub fn host(msg: impl Into<String>) -> Self {
        TaggerError::Host(msg.into())
    }

    /// Create a publish error with context
    pub fn publish(msg: impl Into<String>) -> Self {
        TaggerError::Publish(msg.into())
    }

    /// True for failures caused by caller input rather than the environment.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            TaggerError::InvalidChangeType(_) | TaggerError::Config(_)
        )
    }
}
