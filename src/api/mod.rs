//! MuseScore to LilyPond WASM API
//!
//! # Module Structure
//!
//! - `helpers`: console logging macros and serialization helpers
//! - `export`: the conversion entry points

pub mod helpers;
pub mod export;

pub use export::{convert_mscx_to_lilypond, read_mscx_model};
