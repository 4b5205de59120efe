//! Error types for quire operations.

use thiserror::Error;

/// Errors that can occur while loading or converting a manuscript.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed XHTML: {0}")]
    Malformed(String),

    #[error("HTML rewrite failed: {0}")]
    Rewrite(String),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("manuscript has no content")]
    EmptyDocument,
}

impl From<lol_html::errors::RewritingError> for Error {
    fn from(e: lol_html::errors::RewritingError) -> Self {
        Error::Rewrite(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
