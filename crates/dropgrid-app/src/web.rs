//! WASM entry points.

use wasm_bindgen::prelude::*;

/// Initialize panic reporting and logging.
#[wasm_bindgen(start)]
pub fn start_wasm() {
    console_error_panic_hook::set_once();

    // A logger installed earlier stays in place.
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Starting DropGrid (WASM)");
}

/// Replay a scenario given as JSON and return the report as JSON.
#[wasm_bindgen]
pub fn replay_scenario(json: &str) -> Result<String, JsValue> {
    let scenario = crate::parse_scenario(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let report = crate::replay(&scenario).map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_json::to_string(&report).map_err(|e| JsValue::from_str(&e.to_string()))
}
