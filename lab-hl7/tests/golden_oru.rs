use std::fs;

use lab_core::ParseOptions;
use lab_hl7::{parse_message, prompt::observations_prompt_block};
use serde_json::Value;

fn fixture_path(name: &str) -> String {
    format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn hormone_panel_matches_golden() {
    let message =
        fs::read_to_string(fixture_path("hormone_panel.hl7")).expect("fixture message missing");

    let parsed = parse_message(&message, &ParseOptions::default()).expect("message should parse");
    let actual = serde_json::to_value(parsed).expect("result should serialize");

    let expected = fs::read_to_string(fixture_path("hormone_panel_parsed.json"))
        .expect("golden snapshot missing");
    let expected: Value = serde_json::from_str(&expected).expect("golden snapshot is not JSON");

    assert_eq!(actual, expected);
}

#[test]
fn hormone_panel_prompt_block() {
    let message =
        fs::read_to_string(fixture_path("hormone_panel.hl7")).expect("fixture message missing");
    let parsed = parse_message(&message, &ParseOptions::default()).expect("message should parse");

    let expected = [
        "FERR: Ferritin = 35 ng/mL (ref: 22-322) [below_idealrange] {ideal: 70-100}",
        "CORT: Cortisol Diurnal = 480 nmol/L (ref: 133.0-537.0) [normal]",
        "NA: Natrium = 146 mmol/L (ref: 135-145) [above_refrange]",
        "KOMM: Kommentar = siehe Befund",
    ]
    .join("\n");
    assert_eq!(observations_prompt_block(&parsed), expected);
}
