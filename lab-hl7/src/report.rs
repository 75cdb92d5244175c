//! Decoding of the analysis report returned by the external AI service.
//!
//! The service is asked for a JSON object but is not guaranteed to comply.
//! Anything that is not a JSON object becomes [`ReportOutcome::Fallback`]
//! carrying the raw text, so callers can tell a degraded report apart from
//! a structured one that happens to be empty.

use lab_core::{CanonicalStatus, HairStatus};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AiReport {
    #[serde(deserialize_with = "lenient_string")]
    pub medical_record_analysis: String,
    #[serde(deserialize_with = "lenient_string")]
    pub general_health: String,
    #[serde(deserialize_with = "lenient_string")]
    pub hair_summary: String,
    #[serde(deserialize_with = "lenient_string")]
    pub etiology_assessment: String,
    #[serde(deserialize_with = "lenient_string")]
    pub regenerative_indication: String,
    #[serde(deserialize_with = "lenient_list")]
    pub panels: Vec<ReportPanel>,
    #[serde(deserialize_with = "lenient_list")]
    pub action_plan: Vec<String>,
}

impl AiReport {
    pub fn biomarkers(&self) -> impl Iterator<Item = &ReportBiomarker> {
        self.panels.iter().flat_map(|panel| panel.biomarkers.iter())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportPanel {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_list")]
    pub biomarkers: Vec<ReportBiomarker>,
}

/// One biomarker row as reported by the AI service. Values are kept as text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportBiomarker {
    #[serde(deserialize_with = "lenient_string")]
    pub code: String,
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub value: String,
    #[serde(deserialize_with = "lenient_string")]
    pub units: String,
    #[serde(deserialize_with = "lenient_string")]
    pub ref_range: String,
    #[serde(deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(deserialize_with = "lenient_string")]
    pub hair_status: String,
    #[serde(deserialize_with = "lenient_string")]
    pub interpretation: String,
}

impl ReportBiomarker {
    /// Medical status mapped onto the canonical vocabulary.
    pub fn canonical_status(&self) -> CanonicalStatus {
        CanonicalStatus::normalize(&self.status)
    }

    pub fn hair_status(&self) -> HairStatus {
        HairStatus::from_wire(&self.hair_status)
    }

    pub fn is_abnormal(&self) -> bool {
        self.canonical_status().is_abnormal()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportOutcome {
    Structured { report: AiReport },
    Fallback { raw_text: String },
}

impl ReportOutcome {
    pub fn report(&self) -> Option<&AiReport> {
        match self {
            ReportOutcome::Structured { report } => Some(report),
            ReportOutcome::Fallback { .. } => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ReportOutcome::Fallback { .. })
    }
}

/// Decode the service response. Never fails.
pub fn decode_report(text: &str) -> ReportOutcome {
    let cleaned = strip_code_fence(text);

    let value = match serde_json::from_str::<Value>(cleaned) {
        Ok(value @ Value::Object(_)) => value,
        Ok(_) => {
            debug!("AI response is JSON but not an object, keeping raw text");
            return fallback(text);
        }
        Err(err) => {
            debug!(error = %err, "AI response is not JSON, keeping raw text");
            return fallback(text);
        }
    };

    match serde_json::from_value::<AiReport>(value) {
        Ok(report) => ReportOutcome::Structured { report },
        Err(err) => {
            debug!(error = %err, "AI response does not match the report shape");
            fallback(text)
        }
    }
}

fn fallback(text: &str) -> ReportOutcome {
    ReportOutcome::Fallback {
        raw_text: text.to_string(),
    }
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

/// Accept strings, numbers and booleans as text; anything else is empty.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => String::new(),
    })
}

/// Keep the array items that decode, skip the rest.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}
