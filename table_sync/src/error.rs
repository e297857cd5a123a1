//! Error types for table_sync

use thiserror::Error;

/// Result type for table_sync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for table_sync
#[derive(Error, Debug)]
pub enum Error {
    /// The caller asked for something that cannot work: no table, no columns,
    /// an unknown driver, an unreadable config file.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A statement executor or schema introspector failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// The selected database engine does not implement the requested task.
    #[error("The {engine} engine does not support {operation}")]
    UnsupportedOperation {
        engine: &'static str,
        operation: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl Error {
    /// Build an [`Error::UnsupportedOperation`] for `engine`.
    pub fn unsupported(engine: &'static str, operation: impl Into<String>) -> Self {
        Error::UnsupportedOperation {
            engine,
            operation: operation.into(),
        }
    }

    /// Whether this error came from the executor or introspector collaborators.
    pub fn is_execution_error(&self) -> bool {
        matches!(self, Error::DatabaseError(_) | Error::SqlxError(_))
    }
}

/// Convert Serde JSON errors to table_sync errors
impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::SerializationError(error.to_string())
    }
}

/// Convert Serde YAML errors to table_sync errors
impl From<serde_yaml::Error> for Error {
    fn from(error: serde_yaml::Error) -> Self {
        Error::SerializationError(error.to_string())
    }
}

/// Convert TOML deserialization errors to table_sync errors
impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Error::ConfigError(error.to_string())
    }
}
