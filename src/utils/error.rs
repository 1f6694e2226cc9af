// src/utils/error.rs
use thiserror::Error;

// Structure extraction itself never fails; these cover the inputs and outputs around it.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("URL cannot be empty")]
    EmptyUrl,

    #[error("Invalid URL '{0}': {1}")]
    InvalidUrl(String, #[source] url::ParseError),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
