//! WebAssembly bindings for Mermend
//!
//! Browser-side editors normalize markup locally before handing it to the
//! JavaScript rendering engine. Rendering and export stay on the JS side.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use crate::core::{LabelKind, NormalizerConfig};
#[cfg(target_arch = "wasm32")]
use crate::normalizer::Normalizer;
#[cfg(target_arch = "wasm32")]
use crate::passes::sanitize_label;

/// Initialize WASM module
///
/// Sets up panic hooks and logging for better error messages in the browser.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    use crate::core::logging::init_logging;
    let _ = init_logging(Some("info"), None);
}

/// Normalize diagram markup with the default settings
///
/// Returns an empty string when nothing renderable is left.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn normalize_markup(input: &str) -> String {
    crate::normalize(input)
}

/// Normalize diagram markup and report what was repaired
///
/// # Returns
/// * JSON string with `markup`, `empty`, `split_lines` and `dropped_pairs`
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn normalize_markup_json(input: &str) -> String {
    let normalized = Normalizer::new().normalize(input);

    serde_json::json!({
        "markup": normalized.markup,
        "empty": normalized.is_empty(),
        "split_lines": normalized.report.split_lines,
        "dropped_pairs": normalized.report.dropped_pairs,
    })
    .to_string()
}

/// Sanitize a single label
///
/// # Arguments
/// * `label` - Text found between the delimiters
/// * `decision` - `true` for `{decision}` labels, `false` for `[box]` labels
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn sanitize_label_text(label: &str, decision: bool) -> String {
    let kind = if decision {
        LabelKind::Decision
    } else {
        LabelKind::Box
    };
    sanitize_label(label, kind, &NormalizerConfig::default())
}
