//! Core data model for structured lab messages and biomarker classification.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub mod classify;
pub mod cortisol;
pub mod range;
pub mod reference;
pub mod status;

pub use classify::{classify, Classification, CORTISOL_CODE};
pub use cortisol::{cortisol_range_at, hour_from_timestamp, Capping, CortisolRange};
pub use range::{parse_numeric_value, parse_range, Interval, IntervalKind};
pub use reference::{ReferenceTable, ReferenceTableEntry};
pub use status::{
    is_status_abnormal, AiStatus, CanonicalStatus, ClassifierStatus, HairStatus, Severity,
};

/// Options controlling a single parse run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParseOptions {
    /// Ideal-range table override. `None` uses the built-in table.
    #[serde(default)]
    pub reference_table: Option<ReferenceTable>,
    /// Repair known mojibake in the whole message before scanning.
    #[serde(default = "default_true")]
    pub repair_mojibake: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            reference_table: None,
            repair_mojibake: true,
        }
    }
}

impl ParseOptions {
    /// Table used for ideal-range lookups during this run.
    pub fn reference_table(&self) -> &ReferenceTable {
        self.reference_table
            .as_ref()
            .unwrap_or(ReferenceTable::builtin())
    }
}

fn default_true() -> bool {
    true
}

/// Message type composite from MSH-9.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageType {
    pub id: String,
    pub trigger: String,
}

/// Header data taken from the MSH segment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageHeader {
    pub sending_application: String,
    pub sending_facility: String,
    pub message_datetime: String,
    pub message_type: MessageType,
    pub control_id: String,
    pub processing_id: String,
    pub version: String,
    pub charset: Option<String>,
}

impl MessageHeader {
    /// Message timestamp, when it was a full `YYYYMMDDHHMMSS` value.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        parse_iso_datetime(&self.message_datetime)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
}

/// Patient demographics from the PID segment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Patient {
    pub id: String,
    pub assigning_authority: Option<String>,
    pub last_name: String,
    pub first_name: String,
    /// `YYYY-MM-DD` when the source value was an 8-digit date, raw otherwise.
    pub birth_date: String,
    pub sex: String,
    pub phone: Option<String>,
    pub address: Option<Address>,
}

impl Patient {
    /// Display name in `First Last` order, skipping empty parts.
    pub fn full_name(&self) -> String {
        [self.first_name.as_str(), self.last_name.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn parsed_birth_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.birth_date, "%Y-%m-%d").ok()
    }

    /// Age in completed years on the given day.
    pub fn age_on(&self, day: NaiveDate) -> Option<u32> {
        let born = self.parsed_birth_date()?;
        day.years_since(born)
    }
}

/// Person (ordering provider) composite shared by ORC and OBR.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Provider {
    pub id: Option<String>,
    pub last: Option<String>,
    pub first: Option<String>,
    pub authority: Option<String>,
}

/// Common order data from an ORC segment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Order {
    pub placer_order_number: Option<String>,
    pub filler_order_number: Option<String>,
    pub order_control: String,
    pub order_datetime: Option<String>,
    pub ordering_provider: Option<Provider>,
}

/// Observation request (panel) from an OBR segment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObservationRequest {
    pub panel_code: String,
    pub panel_text: Option<String>,
    /// Specimen collection time inherited by the OBX segments that follow.
    pub request_datetime: Option<String>,
    pub result_datetime: Option<String>,
    pub ordering_provider: Option<Provider>,
}

/// A single result from an OBX segment plus its derived classification.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Observation {
    pub set_id: u32,
    pub value_type: String,
    pub code: String,
    pub text: String,
    pub system: Option<String>,
    /// Raw value; numeric parsing happens during classification.
    pub value: String,
    pub units: Option<String>,
    pub reference_range: Option<String>,
    pub abnormal_flags: Option<String>,
    pub result_status: String,
    pub observation_datetime: Option<String>,
    pub specimen_collection_time: Option<String>,
    pub notes: Vec<String>,
    #[serde(with = "status::wire")]
    pub status: Option<ClassifierStatus>,
    pub ideal_range: Option<String>,
}

impl Observation {
    pub fn numeric_value(&self) -> Option<f64> {
        parse_numeric_value(&self.value)
    }

    /// Timestamp used for time-dependent ranges: collection time first.
    pub fn timing_reference(&self) -> Option<&str> {
        self.specimen_collection_time
            .as_deref()
            .or(self.observation_datetime.as_deref())
    }

    pub fn canonical_status(&self) -> CanonicalStatus {
        self.status
            .map(CanonicalStatus::from)
            .unwrap_or(CanonicalStatus::Unknown)
    }

    pub fn apply(&mut self, classification: Classification) {
        self.status = classification.status;
        self.ideal_range = classification.ideal_range;
    }
}

/// Free-standing NTE segment not attached to any observation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoteSegment {
    pub set_id: u32,
    pub text: String,
}

/// Everything extracted from one message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParsedResult {
    pub header: Option<MessageHeader>,
    pub patient: Option<Patient>,
    pub orders: Vec<Order>,
    pub observation_requests: Vec<ObservationRequest>,
    pub observations: Vec<Observation>,
    pub notes: Vec<NoteSegment>,
    pub message_type: String,
    pub total_segments: usize,
}

impl ParsedResult {
    /// Observations whose canonical status calls for highlighting.
    pub fn abnormal_observations(&self) -> impl Iterator<Item = &Observation> {
        self.observations
            .iter()
            .filter(|obs| obs.canonical_status().is_abnormal())
    }

    pub fn observation(&self, code: &str) -> Option<&Observation> {
        self.observations
            .iter()
            .find(|obs| obs.code.eq_ignore_ascii_case(code))
    }
}

/// Errors surfaced by the lab pipeline.
#[derive(Debug, thiserror::Error)]
pub enum LabError {
    #[error("Empty HL7 message")]
    EmptyMessage,
    #[error("Invalid reference table: {0}")]
    ReferenceTable(String),
}

fn parse_iso_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patient_age_and_name() {
        let patient = Patient {
            first_name: "John".into(),
            last_name: "Doe".into(),
            birth_date: "1980-01-01".into(),
            ..Patient::default()
        };
        let day = NaiveDate::from_ymd_opt(2023, 1, 15).unwrap();
        assert_eq!(patient.age_on(day), Some(43));
        assert_eq!(patient.full_name(), "John Doe");
    }

    #[test]
    fn unformatted_birth_date_has_no_age() {
        let patient = Patient {
            birth_date: "1980".into(),
            ..Patient::default()
        };
        let day = NaiveDate::from_ymd_opt(2023, 1, 15).unwrap();
        assert_eq!(patient.age_on(day), None);
    }

    #[test]
    fn timing_prefers_collection_time() {
        let mut obs = Observation {
            observation_datetime: Some("2023-01-15T14:30:00".into()),
            ..Observation::default()
        };
        assert_eq!(obs.timing_reference(), Some("2023-01-15T14:30:00"));
        obs.specimen_collection_time = Some("2023-01-15T09:00:00".into());
        assert_eq!(obs.timing_reference(), Some("2023-01-15T09:00:00"));
    }

    #[test]
    fn header_timestamp_requires_full_datetime() {
        let mut header = MessageHeader {
            message_datetime: "2023-01-15T14:30:00".into(),
            ..MessageHeader::default()
        };
        assert!(header.timestamp().is_some());
        header.message_datetime = "2023-01-15".into();
        assert!(header.timestamp().is_none());
    }

    #[test]
    fn unclassified_observation_is_unknown() {
        let obs = Observation::default();
        assert_eq!(obs.canonical_status(), CanonicalStatus::Unknown);
        let json = serde_json::to_value(&obs).unwrap();
        assert_eq!(json["status"], "");
    }

    #[test]
    fn parse_options_override_table() {
        let options = ParseOptions {
            reference_table: Some(ReferenceTable::new(Vec::new())),
            ..ParseOptions::default()
        };
        assert!(options.reference_table().is_empty());
    }

    #[test]
    fn parse_options_default_uses_builtin_table() {
        let options: ParseOptions = serde_json::from_str("{}").unwrap();
        assert!(options.repair_mojibake);
        assert_eq!(options.reference_table().lookup_ideal("ferr"), Some("70-100"));
    }
}
