//! Error types for metadata extraction

use thiserror::Error;

/// Result type for extraction operations
pub type Result<T> = std::result::Result<T, MetadataError>;

/// Metadata extraction errors
///
/// Every variant aborts the extraction: no partial package is ever produced.
#[derive(Error, Debug)]
pub enum MetadataError {
    /// A required structured field failed strict parsing
    #[error("Invalid format: {0}")]
    Format(String),

    /// A field violates a shape or length constraint
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The manifest declares a content entry the archive does not contain
    #[error("Package is missing declared entry: {path}")]
    Integrity { path: String },

    #[error("Extraction was cancelled")]
    Cancelled,

    #[error("Archive entry not found: {path}")]
    NotFound { path: String },

    #[error("Package does not declare a {0}")]
    MissingResource(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MetadataError {
    /// True for errors that mean the pushed archive itself must be rejected
    pub fn rejects_package(&self) -> bool {
        matches!(
            self,
            MetadataError::Format(_)
                | MetadataError::Validation(_)
                | MetadataError::Integrity { .. }
                | MetadataError::Json(_)
        )
    }
}
