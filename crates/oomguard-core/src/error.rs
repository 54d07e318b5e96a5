//! Error types for oomguard.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid task id: {0}")]
    InvalidTaskId(String),

    #[error("Invalid query id: {0}")]
    InvalidQueryId(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
