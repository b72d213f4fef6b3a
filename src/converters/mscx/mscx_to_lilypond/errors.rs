//! Error types for MuseScore conversion
//!
//! Fatal errors abort the whole conversion. Unknown decorative detail
//! (articulations, fermatas, barline glyphs) never produces an error; it
//! renders as nothing instead.

use thiserror::Error;

/// Top-level conversion error type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// A duration token has no entry in the duration table
    #[error("Unknown duration: {0}")]
    UnknownDuration(String),

    /// A part points at a staff id that the score does not contain
    #[error("Part {part} references missing staff {staff}")]
    MissingStaffReference { part: String, staff: String },

    /// The source document could not be read
    #[error("Malformed document: {0}")]
    MalformedDocument(#[from] ParseError),

    /// Internal conversion error (template rendering, should not occur)
    #[error("Internal conversion error: {0}")]
    InternalError(String),
}

/// Fatal document-level errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// XML is malformed (not well-formed)
    #[error("Invalid XML: {0}")]
    InvalidXml(String),

    /// Root element is not a MuseScore document
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// Required structural element is missing
    #[error("Missing required element: {0}")]
    MissingRequiredElement(String),
}
