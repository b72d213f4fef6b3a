//! Conversion entry points exported to JavaScript

use wasm_bindgen::prelude::*;
use crate::api::helpers::{js_error, serialize};
use crate::converters::mscx::{self, ConversionSettings};
use crate::{wasm_info, wasm_log, wasm_warn};

/// Parse the optional settings JSON. `None` or an empty string means defaults.
pub fn parse_settings(settings_json: Option<String>) -> Result<Option<ConversionSettings>, serde_json::Error> {
    match settings_json {
        Some(json) if !json.trim().is_empty() => serde_json::from_str(&json).map(Some),
        _ => Ok(None),
    }
}

/// Convert a MuseScore document to LilyPond
///
/// # Parameters
/// * `mscx` - uncompressed MuseScore document (.mscx contents)
/// * `settings_json` - optional settings object as JSON:
///   `scorePaperSize`, `partsPaperSize`, `scoreStaffSize`, `partsStaffSize`,
///   `targetLilypondVersion`
///
/// # Returns
/// JSON string with `music`, `parts`, `score`, `version` and `skippedElements`
#[wasm_bindgen(js_name = convertMscxToLilyPond)]
pub fn convert_mscx_to_lilypond(mscx: String, settings_json: Option<String>) -> Result<String, JsValue> {
    wasm_info!("convertMscxToLilyPond called ({} bytes)", mscx.len());

    let settings = parse_settings(settings_json)
        .map_err(|e| js_error("Settings parse error", e))?;

    let result = mscx::convert_mscx_to_lilypond(&mscx, settings)
        .map_err(|e| js_error("Conversion error", e))?;

    let result_json = serde_json::to_string(&result)
        .map_err(|e| js_error("Result serialization error", e))?;

    wasm_info!(
        "  LilyPond generated: music {} bytes, parts {} bytes, score {} bytes",
        result.music.len(),
        result.parts.len(),
        result.score.len()
    );
    if !result.skipped_elements.is_empty() {
        wasm_warn!("  Skipped {} elements during conversion", result.skipped_elements.len());
        for skipped in &result.skipped_elements {
            wasm_log!("    {}: {}", skipped.element_type, skipped.reason);
        }
    }

    Ok(result_json)
}

/// Read a MuseScore document into its score model (order, grouped parts,
/// metadata) without rendering
#[wasm_bindgen(js_name = readMscxModel)]
pub fn read_mscx_model(mscx: String) -> Result<JsValue, JsValue> {
    wasm_info!("readMscxModel called ({} bytes)", mscx.len());

    let model = mscx::read_score_model(&mscx)
        .map_err(|e| js_error("Model error", e))?;

    serialize(&model, "Model serialization error")
}
