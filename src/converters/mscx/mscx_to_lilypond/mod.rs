//! MuseScore to LilyPond converter module
//!
//! Converts uncompressed MuseScore documents (`.mscx`) into LilyPond 2.24
//! source, split into three buffers: the music macros, one `\book` per
//! part, and the full score `\book`.
//!
//! # Overview
//!
//! The converter is a straight pipeline:
//! 1. **Parse**: read the XML into an ordered tree (roxmltree)
//! 2. **Model**: build order info, flattened staves and parts
//! 3. **Group**: wrap contiguous parts of one section
//! 4. **Render**: turn each staff into measure text
//! 5. **Assemble**: allocate identifiers and compose the documents
//!
//! # Basic Usage
//!
//! ```ignore
//! use mscx2ly_wasm::converters::mscx::{convert_mscx_to_lilypond, ConversionSettings};
//!
//! let result = convert_mscx_to_lilypond(&mscx, Some(ConversionSettings {
//!     parts_paper_size: Some("a4".to_string()),
//!     ..Default::default()
//! }))?;
//! std::fs::write("score.ly", result.combined())?;
//! ```

pub mod errors;
pub mod types;
pub mod parser;
pub mod model;
pub mod grouping;
pub mod pitch;
pub mod converter;
pub mod templates;
pub mod lilypond;

// Re-export main API
pub use errors::{ConversionError, ParseError};
pub use parser::OrderedNode;
pub use types::{ConversionResult, ConversionSettings, ScoreModel, SkippedElement};

/// Convert a MuseScore document to LilyPond source code.
///
/// # Arguments
///
/// * `mscx` - uncompressed MuseScore document as string
/// * `settings` - Optional conversion settings (uses defaults if None)
///
/// # Returns
///
/// * `Ok(ConversionResult)` - the three output buffers and a skip report
/// * `Err(ConversionError)` - fatal error; no partial output is produced
pub fn convert_mscx_to_lilypond(
    mscx: &str,
    settings: Option<ConversionSettings>,
) -> Result<ConversionResult, ConversionError> {
    let root = OrderedNode::parse(mscx)?;
    convert_document(&root, settings)
}

/// Convert an already parsed document
pub fn convert_document(
    root: &OrderedNode,
    settings: Option<ConversionSettings>,
) -> Result<ConversionResult, ConversionError> {
    let settings = settings.unwrap_or_default();
    let model = model::build_score_model(root)?;
    lilypond::generate_lilypond_documents(&model, &settings)
}

/// Parse a document into its score model without rendering
pub fn read_score_model(mscx: &str) -> Result<ScoreModel, ConversionError> {
    let root = OrderedNode::parse(mscx)?;
    model::build_score_model(&root)
}
