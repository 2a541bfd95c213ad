//! Error taxonomy shared by the document store, drawing engine, and collaborators.

use std::path::PathBuf;
use thiserror::Error;

pub type AideResult<T> = Result<T, AideError>;

#[derive(Error, Debug)]
pub enum AideError {
    /// A document failed validation on save. Nothing was written.
    #[error("schema validation failed: {0}")]
    SchemaValidation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("Element ID conflict: {0}")]
    ElementIdConflict(String),

    /// Malformed JSON/YAML, wrong document `type` tag, or a bad date/duration string.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("external service error: {0}")]
    ExternalService(String),

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("background task failed: {0}")]
    Task(String),
}

impl AideError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Short machine-readable kind, used in audit entries.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SchemaValidation(_) => "schema_validation",
            Self::NotFound(_) => "not_found",
            Self::AlreadyExists(_) => "already_exists",
            Self::ElementIdConflict(_) => "element_id_conflict",
            Self::InvalidFormat(_) => "invalid_format",
            Self::ExternalService(_) => "external_service",
            Self::Io { .. } => "io",
            Self::Serialization(_) => "serialization",
            Self::Task(_) => "task",
        }
    }
}

impl From<serde_json::Error> for AideError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AideError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
