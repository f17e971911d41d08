//! Error types for music-analysis

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] duckdb::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// A required input column is missing or has the wrong type.
    #[error("Schema error in '{table}': {reason}")]
    Schema { table: String, reason: String },

    /// Writing one result set failed. Other result sets are unaffected.
    #[error("Failed to write '{name}': {source}")]
    Output {
        name: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Background task failed: {0}")]
    Task(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a schema error for the given input table
    pub fn schema(table: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Schema {
            table: table.into(),
            reason: reason.into(),
        }
    }

    /// Wrap an error raised while writing the named result set
    pub fn output(name: impl Into<String>, source: Self) -> Self {
        Self::Output {
            name: name.into(),
            source: Box::new(source),
        }
    }

    /// Create an "other" error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_message() {
        let err = Error::schema("listening_logs", "missing column 'timestamp'");
        assert_eq!(
            err.to_string(),
            "Schema error in 'listening_logs': missing column 'timestamp'"
        );
    }

    #[test]
    fn test_output_error_keeps_source() {
        let err = Error::output("night_owl_users", Error::other("disk full"));
        assert_eq!(err.to_string(), "Failed to write 'night_owl_users': disk full");
        assert!(std::error::Error::source(&err).is_some());
    }
}
