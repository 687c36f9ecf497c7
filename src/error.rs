//! Crate-level error type

use thiserror::Error;

/// Result type for validator operations.
pub type Result<T> = std::result::Result<T, WffError>;

/// Errors surfaced at the crate boundary (the CLI and the XML adapter).
/// Validation itself never fails with an error: diagnostics live inside
/// [`crate::result::ValidationResult`].
#[derive(Debug, Error)]
pub enum WffError {
    #[error("expression error: {0}")]
    Expression(#[from] crate::expr::ParseError),

    #[error("document error: {0}")]
    Xml(#[from] crate::xml::XmlError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
