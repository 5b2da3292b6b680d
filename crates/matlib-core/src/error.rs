//! Error types for matlib-core

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for model library operations
pub type Result<T> = std::result::Result<T, MatlibError>;

/// Main error type for model library operations
#[derive(Error, Debug)]
pub enum MatlibError {
    /// Document path does not resolve to a file
    #[error("Document not found: {0}")]
    DocumentNotFound(PathBuf),

    /// Identity lookup against a path that does not exist
    #[error("Model not found: {0}")]
    ModelNotFound(PathBuf),

    /// Document is unparsable or lacks its identifying fields
    #[error("Invalid document {path}: {reason}")]
    InvalidDocument { path: PathBuf, reason: String },

    /// Materialization attempted against a library that is not file-backed
    #[error("Invalid library: {0} is not a local library")]
    InvalidLibrary(String),

    /// Two libraries define the same model id and the policy forbids it
    #[error("Duplicate model {uuid} in library {library}")]
    DuplicateModel { uuid: String, library: String },

    /// Configuration could not be read or is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MatlibError {
    pub(crate) fn invalid_document(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        MatlibError::InvalidDocument {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error only affects a single document
    ///
    /// Such errors are logged and skipped during a bulk load.
    pub fn is_document_error(&self) -> bool {
        matches!(
            self,
            MatlibError::DocumentNotFound(_)
                | MatlibError::ModelNotFound(_)
                | MatlibError::InvalidDocument { .. }
        )
    }
}

impl From<toml::de::Error> for MatlibError {
    fn from(err: toml::de::Error) -> Self {
        MatlibError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for MatlibError {
    fn from(err: serde_json::Error) -> Self {
        MatlibError::Config(err.to_string())
    }
}
