//! Error types for the Spanner dialect library.

use thiserror::Error;

/// Process exit codes reported by the CLI for each error category.
pub const EXIT_CONFIG_ERROR: u8 = 1;
pub const EXIT_VALIDATION_ERROR: u8 = 2;
pub const EXIT_UNSUPPORTED: u8 = 3;
pub const EXIT_GENERATION_ERROR: u8 = 4;
pub const EXIT_METADATA_ERROR: u8 = 5;
pub const EXIT_CONNECTION_ERROR: u8 = 6;
pub const EXIT_IO_ERROR: u8 = 7;

/// Main error type for statement generation, snapshots and configuration.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A statement failed validation. Nothing was generated for it.
    #[error("Validation failed for {statement}: {}", .errors.join("; "))]
    Validation {
        statement: String,
        errors: Vec<String>,
    },

    /// The statement can never be expressed on Cloud Spanner.
    ///
    /// Raised from `generate` for statement kinds whose failure cannot be
    /// reported through validation.
    #[error("{0}")]
    Unsupported(String),

    /// SQL generation failed after validation passed.
    #[error("Generation failed: {0}")]
    Generation(String),

    /// No registered generator claims the statement for the dialect.
    #[error("No SQL generator for {kind} on dialect {dialect}")]
    NoGenerator { kind: String, dialect: String },

    /// An identifier is empty, too long or otherwise unusable.
    #[error("Invalid identifier: {0}")]
    Identifier(String),

    /// A metadata lookup against INFORMATION_SCHEMA failed.
    #[error("{message}")]
    Metadata {
        message: String,
        #[source]
        source: Option<Box<MigrateError>>,
    },

    /// Raw query failure reported by a metadata source.
    #[error("Query failed: {0}")]
    Query(String),

    /// Connection could not be opened or closed.
    #[error("Connection error: {0}")]
    Connection(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MigrateError {
    /// Create a Validation error for a statement description.
    pub fn validation(statement: impl Into<String>, errors: Vec<String>) -> Self {
        MigrateError::Validation {
            statement: statement.into(),
            errors,
        }
    }

    /// Create a Metadata error without an underlying cause.
    pub fn metadata(message: impl Into<String>) -> Self {
        MigrateError::Metadata {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap a lower-level failure into a Metadata error.
    pub fn metadata_with(message: impl Into<String>, source: MigrateError) -> Self {
        MigrateError::Metadata {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a NoGenerator error.
    pub fn no_generator(kind: impl Into<String>, dialect: impl Into<String>) -> Self {
        MigrateError::NoGenerator {
            kind: kind.into(),
            dialect: dialect.into(),
        }
    }

    /// Exit code the CLI reports for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            MigrateError::Config(_)
            | MigrateError::Identifier(_)
            | MigrateError::Yaml(_)
            | MigrateError::Json(_) => EXIT_CONFIG_ERROR,
            MigrateError::Validation { .. } => EXIT_VALIDATION_ERROR,
            MigrateError::Unsupported(_) => EXIT_UNSUPPORTED,
            MigrateError::Generation(_) | MigrateError::NoGenerator { .. } => {
                EXIT_GENERATION_ERROR
            }
            MigrateError::Metadata { .. } | MigrateError::Query(_) => EXIT_METADATA_ERROR,
            MigrateError::Connection(_) => EXIT_CONNECTION_ERROR,
            MigrateError::Io(_) => EXIT_IO_ERROR,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
