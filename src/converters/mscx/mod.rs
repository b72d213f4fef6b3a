//! MuseScore format converters

pub mod mscx_to_lilypond;

// Re-export main API
pub use mscx_to_lilypond::{
    convert_document, convert_mscx_to_lilypond, read_score_model, ConversionError,
    ConversionResult, ConversionSettings, OrderedNode, ParseError, ScoreModel, SkippedElement,
};
