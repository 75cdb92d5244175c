//! Plain-text observation lines embedded in the analysis prompt.

use lab_core::{Observation, ParsedResult};

/// `CODE: TEXT = VALUE UNITS (ref: RANGE) [STATUS] {ideal: RANGE}`, with
/// absent parts left out.
pub fn observation_prompt_line(observation: &Observation) -> String {
    let mut parts = vec![format!(
        "{}: {} = {}",
        observation.code, observation.text, observation.value
    )];

    if let Some(units) = observation.units.as_deref() {
        parts.push(units.to_string());
    }
    if let Some(range) = observation.reference_range.as_deref() {
        parts.push(format!("(ref: {range})"));
    }
    if let Some(status) = observation.status {
        parts.push(format!("[{}]", status.as_str()));
    }
    if let Some(ideal) = observation.ideal_range.as_deref() {
        parts.push(format!("{{ideal: {ideal}}}"));
    }

    parts.join(" ")
}

/// One prompt line per observation, in message order.
pub fn observations_prompt_block(parsed: &ParsedResult) -> String {
    parsed
        .observations
        .iter()
        .map(observation_prompt_line)
        .collect::<Vec<_>>()
        .join("\n")
}
