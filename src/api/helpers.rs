//! Shared helpers for WASM API operations
//!
//! Console logging macros and serialization helpers used by the exported
//! conversion functions.

use wasm_bindgen::prelude::*;
use serde::Serialize;

// ============================================================================
// Console Logging Functions
// ============================================================================

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);

    #[wasm_bindgen(js_namespace = console)]
    fn info(s: &str);

    #[wasm_bindgen(js_namespace = console)]
    fn warn(s: &str);

    #[wasm_bindgen(js_namespace = console)]
    fn error(s: &str);
}

// ============================================================================
// Logging Macros
// ============================================================================

/// Log a debug message with [mscx2ly] prefix
#[macro_export]
macro_rules! wasm_log {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_debug(&format!($($arg)*))
    };
}

/// Log an info message with [mscx2ly] prefix
#[macro_export]
macro_rules! wasm_info {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_info(&format!($($arg)*))
    };
}

/// Log a warning message with [mscx2ly] ⚠️ prefix
#[macro_export]
macro_rules! wasm_warn {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_warn(&format!($($arg)*))
    };
}

/// Log an error message with [mscx2ly] ❌ prefix
#[macro_export]
macro_rules! wasm_error {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_error(&format!($($arg)*))
    };
}

// ============================================================================
// Logging Helper Functions (called by macros)
// ============================================================================

pub fn log_debug(msg: &str) {
    log(&format!("[mscx2ly] {}", msg));
}

pub fn log_info(msg: &str) {
    info(&format!("[mscx2ly] {}", msg));
}

pub fn log_warn(msg: &str) {
    warn(&format!("[mscx2ly] ⚠️ {}", msg));
}

pub fn log_error(msg: &str) {
    error(&format!("[mscx2ly] ❌ {}", msg));
}

// ============================================================================
// Error and Serialization Helpers
// ============================================================================

/// Log an error and turn it into a JS string value
pub fn js_error(context: &str, err: impl std::fmt::Display) -> JsValue {
    let msg = format!("{}: {}", context, err);
    log_error(&msg);
    JsValue::from_str(&msg)
}

/// Serialize a value to JavaScript with automatic error handling
pub fn serialize<T: Serialize>(value: &T, error_context: &str) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| js_error(error_context, e))
}
