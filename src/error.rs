use thiserror::Error;

/// Main error type for kintree
#[derive(Error, Debug)]
pub enum KintreeError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// No person matches the given name or id
    #[error("Person not found: {0}")]
    PersonNotFound(String),

    /// No parent edge has the given id
    #[error("Relationship not found: {0}")]
    RelationshipNotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Parse errors (family files, request bodies)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Response encoding errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for KintreeError {
    fn from(err: serde_json::Error) -> Self {
        KintreeError::Parse(err.to_string())
    }
}

/// Convenient Result type using KintreeError
pub type Result<T> = std::result::Result<T, KintreeError>;
