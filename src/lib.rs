pub mod diagnostics;
pub mod error;
pub mod keyboard;
pub mod lexer;
pub mod mapper;
pub mod parser;
pub mod session;
pub mod settings;
pub mod token;
pub mod tuning;

use crate::error::XenboardError;
use crate::keyboard::KeyboardConfig;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::settings::RawSettings;
use crate::tuning::Tuning;
use wasm_bindgen::prelude::*;

pub use crate::keyboard::{FrequencyTable, resolve};
pub use crate::mapper::{calculate_cents, calculate_frequency, calculate_mapped_frequency, get_note_name};
pub use crate::tuning::generate_z_limit_ratios;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the xenboard-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// Parse a tuning descriptor (`"19ed2"`, `"7-limit"`) into a [`Tuning`].
///
/// Surrounding whitespace is ignored and keywords are case-insensitive. No
/// fallback happens here: callers decide whether to use [`Tuning::default`]
/// or report the error.
pub fn parse_tuning(descriptor: &str) -> Result<Tuning, XenboardError> {
    let tokens = Lexer::new(descriptor.trim()).tokenize()?;
    let mut parser = Parser::new(tokens);
    let tuning = parser.parse_tuning()?;
    log::debug!("parsed tuning '{}' ({} steps per period)", tuning, tuning.steps_per_period());
    Ok(tuning)
}

/// WASM-exposed: resolve a descriptor into its tuning structure (kind,
/// divisions or limit, and JI ratios).
#[wasm_bindgen]
pub fn describe_tuning(descriptor: &str) -> Result<JsValue, JsValue> {
    let tuning = parse_tuning(descriptor).map_err(|e| JsValue::from_str(&e.render(descriptor)))?;
    serde_wasm_bindgen::to_value(&tuning).map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// WASM-exposed: the z-limit ratio values in `[1, 2)`, ascending.
#[wasm_bindgen]
pub fn z_limit_ratios(limit: u32) -> Result<Vec<f64>, JsValue> {
    let descriptor = format!("{limit}-limit");
    let tuning = parse_tuning(&descriptor).map_err(|e| JsValue::from_str(&e.render(&descriptor)))?;
    Ok(tuning.step_ratios())
}

/// WASM-exposed: build the full keyboard table from the settings form
/// (`{ baseFreq, rows, cols, rootNote, tuning, mapping, noteNames }`, all
/// strings).
#[wasm_bindgen]
pub fn build_keyboard(settings: JsValue) -> Result<JsValue, JsValue> {
    let raw: RawSettings =
        serde_wasm_bindgen::from_value(settings).map_err(|e| JsValue::from_str(&format!("{e}")))?;
    let config = KeyboardConfig::from_raw(&raw).map_err(|e| JsValue::from_str(&e.render(&raw.tuning)))?;
    let table = resolve(&config);
    serde_wasm_bindgen::to_value(&table).map_err(|e| JsValue::from_str(&format!("{e}")))
}
