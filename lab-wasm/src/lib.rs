//! Framework-neutral WASM <-> JavaScript bridge.

use lab_core::{
    is_status_abnormal as status_is_abnormal, CanonicalStatus, LabError, ParseOptions,
    ParsedResult, ReferenceTable, ReferenceTableEntry,
};
use lab_hl7::{prompt::observations_prompt_block, report};
use serde::Deserialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

#[derive(Deserialize)]
struct JsParseOptions {
    #[serde(default)]
    reference_table: Option<Vec<ReferenceTableEntry>>,
    #[serde(default)]
    repair_mojibake: Option<bool>,
}

impl From<JsParseOptions> for ParseOptions {
    fn from(opts: JsParseOptions) -> Self {
        let mut base = ParseOptions::default();
        if let Some(entries) = opts.reference_table {
            base.reference_table = Some(ReferenceTable::new(entries));
        }
        if let Some(repair) = opts.repair_mojibake {
            base.repair_mojibake = repair;
        }
        base
    }
}

#[wasm_bindgen]
pub fn parse_message(raw: &str, options: Option<JsValue>) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let opts = match options {
        Some(js_opts) => {
            let opts: JsParseOptions = from_value(js_opts)
                .map_err(|err| JsValue::from_str(&format!("Could not read options: {err}")))?;
            ParseOptions::from(opts)
        }
        None => ParseOptions::default(),
    };

    let parsed = lab_hl7::parse_message(raw, &opts)
        .map_err(|err| JsValue::from_str(&format_lab_error(err)))?;

    to_value(&parsed)
        .map_err(|err| JsValue::from_str(&format!("Could not serialize result: {err}")))
}

/// Prompt lines for a previously parsed result.
#[wasm_bindgen]
pub fn observations_prompt(parsed: JsValue) -> Result<String, JsValue> {
    let parsed: ParsedResult = from_value(parsed)
        .map_err(|err| JsValue::from_str(&format!("Could not read parsed result: {err}")))?;
    Ok(observations_prompt_block(&parsed))
}

#[wasm_bindgen]
pub fn decode_report(text: &str) -> Result<JsValue, JsValue> {
    to_value(&report::decode_report(text))
        .map_err(|err| JsValue::from_str(&format!("Could not serialize report: {err}")))
}

#[wasm_bindgen]
pub fn normalize_status(raw: &str) -> String {
    CanonicalStatus::normalize(raw).as_str().to_string()
}

#[wasm_bindgen]
pub fn is_status_abnormal(raw: &str) -> bool {
    status_is_abnormal(raw)
}

#[wasm_bindgen]
pub fn status_label(raw: &str) -> String {
    CanonicalStatus::normalize(raw).label().to_string()
}

#[wasm_bindgen]
pub fn status_color_class(raw: &str) -> String {
    CanonicalStatus::normalize(raw).color_class().to_string()
}

#[wasm_bindgen]
pub fn status_row_background(raw: &str) -> String {
    CanonicalStatus::normalize(raw).row_background().to_string()
}

fn format_lab_error(err: LabError) -> String {
    format!("HL7 error: {err}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn js_options_fold_over_defaults() {
        let opts = ParseOptions::from(JsParseOptions {
            reference_table: None,
            repair_mojibake: Some(false),
        });
        assert!(!opts.repair_mojibake);
        assert!(opts.reference_table.is_none());

        let opts = ParseOptions::from(JsParseOptions {
            reference_table: Some(vec![ReferenceTableEntry {
                parameter: "FERR".into(),
                ideal_range: "50-90".into(),
            }]),
            repair_mojibake: None,
        });
        assert!(opts.repair_mojibake);
        assert_eq!(opts.reference_table().lookup_ideal("FERR"), Some("50-90"));
    }

    #[test]
    fn status_helpers() {
        assert_eq!(normalize_status("below_refrange"), "low");
        assert_eq!(status_label("above_idealrange"), "Supraoptimal");
        assert!(is_status_abnormal("critical_high"));
        assert!(!is_status_abnormal(""));
        assert_eq!(status_row_background("normal"), "");
    }

    #[test]
    fn error_message_prefix() {
        assert_eq!(format_lab_error(LabError::EmptyMessage), "HL7 error: Empty HL7 message");
    }
}
