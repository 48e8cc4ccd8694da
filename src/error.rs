use thiserror::Error;

#[derive(Error, Debug)]
pub enum ThreadmarkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No changes to review")]
    NoChanges,

    #[error("Invalid patch: {0}")]
    InvalidPatch(String),

    #[error("Invalid review threads: {0}")]
    InvalidThreads(String),
}

pub type Result<T> = std::result::Result<T, ThreadmarkError>;
