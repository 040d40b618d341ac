//! Error types for the Enercode model layer.

use thiserror::Error;

/// Errors that can occur while driving a model.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid input for field {field}: {input:?}")]
    InvalidInput { field: String, input: String },

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("unknown section: {0}")]
    UnknownSection(String),

    #[error("section registered twice: {0}")]
    DuplicateSection(String),

    #[error("field {field} owned by both {first} and {second}")]
    DuplicateField {
        field: String,
        first: String,
        second: String,
    },

    #[error("section {section} failed to compute: {message}")]
    Compute { section: String, message: String },

    #[error("malformed document: {0}")]
    Document(String),

    #[error("cache encode error: {0}")]
    CacheEncode(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, ModelError>;
