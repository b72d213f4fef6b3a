//! MuseScore to LilyPond WASM Module
//!
//! Converts uncompressed MuseScore scores into LilyPond source: a block of
//! music macros, one book per part and a full score book.

pub mod converters;
pub mod api;

// Re-export commonly used types
pub use converters::mscx::{
    convert_document, convert_mscx_to_lilypond, ConversionError, ConversionResult,
    ConversionSettings,
};

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(feature = "console_log")]
    if console_log::init_with_level(log::Level::Debug).is_err() {
        crate::wasm_warn!("Logger already initialized");
    }

    log::info!("MuseScore to LilyPond WASM module initialized");
}
