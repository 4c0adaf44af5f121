//! Error types for rule mining and evaluation

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CarError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("Unsupported attribute '{name}': type {kind} is not nominal")]
    UnsupportedAttribute { name: String, kind: String },

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type Result<T> = std::result::Result<T, CarError>;
