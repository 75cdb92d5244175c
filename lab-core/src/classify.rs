//! Deterministic status classification for a single observation.
//!
//! Precedence: the cortisol time-curve overrides everything; a value outside
//! the lab reference range is always reported against that range; the ideal
//! range only refines values the lab considers acceptable.

use serde::{Deserialize, Serialize};

use crate::cortisol::{cortisol_range_at, hour_from_timestamp};
use crate::range::{parse_range, Interval};
use crate::reference::ReferenceTable;
use crate::status::ClassifierStatus;
use crate::Observation;

/// Canonical code of the diurnal cortisol analyte.
pub const CORTISOL_CODE: &str = "CORT";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Classification {
    #[serde(with = "crate::status::wire")]
    pub status: Option<ClassifierStatus>,
    /// Set only when the ideal-range table produced the verdict.
    pub ideal_range: Option<String>,
}

impl Classification {
    fn unclassified() -> Self {
        Self::default()
    }

    fn medical(status: ClassifierStatus) -> Self {
        Self {
            status: Some(status),
            ideal_range: None,
        }
    }

    fn ideal(status: ClassifierStatus, ideal_range: &str) -> Self {
        Self {
            status: Some(status),
            ideal_range: Some(ideal_range.to_string()),
        }
    }
}

pub fn classify(observation: &Observation, table: &ReferenceTable) -> Classification {
    let Some(value) = observation.numeric_value() else {
        return Classification::unclassified();
    };

    if observation.code.eq_ignore_ascii_case(CORTISOL_CODE) {
        if let Some(range) = observation
            .timing_reference()
            .and_then(hour_from_timestamp)
            .and_then(cortisol_range_at)
        {
            return Classification::medical(against_reference(
                value,
                &range.standard_interval(),
            ));
        }
    }

    let lab_range = observation.reference_range.as_deref().and_then(parse_range);

    if let Some(lab) = &lab_range {
        if !lab.contains(value) {
            return Classification::medical(against_reference(value, lab));
        }
    }

    if let Some(ideal_text) = table.lookup_ideal(&observation.code) {
        if let Some(ideal) = parse_range(ideal_text) {
            let status = if ideal.contains(value) {
                ClassifierStatus::Normal
            } else if value < ideal.min {
                ClassifierStatus::BelowIdealRange
            } else {
                ClassifierStatus::AboveIdealRange
            };
            return Classification::ideal(status, ideal_text);
        }
    }

    match lab_range {
        Some(lab) => Classification::medical(against_reference(value, &lab)),
        None => Classification::unclassified(),
    }
}

fn against_reference(value: f64, interval: &Interval) -> ClassifierStatus {
    if interval.contains(value) {
        ClassifierStatus::Normal
    } else if value < interval.min {
        ClassifierStatus::BelowRefRange
    } else {
        ClassifierStatus::AboveRefRange
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReferenceTableEntry;

    fn table() -> ReferenceTable {
        ReferenceTable::new(vec![
            ReferenceTableEntry {
                parameter: "FERR".into(),
                ideal_range: "70-100".into(),
            },
            ReferenceTableEntry {
                parameter: "ZN".into(),
                ideal_range: "10-20".into(),
            },
            ReferenceTableEntry {
                parameter: "BROKEN".into(),
                ideal_range: "see comment".into(),
            },
        ])
    }

    fn observation(code: &str, value: &str, range: Option<&str>) -> Observation {
        Observation {
            code: code.into(),
            value: value.into(),
            reference_range: range.map(str::to_string),
            ..Observation::default()
        }
    }

    #[test]
    fn non_numeric_value_is_unclassified() {
        let result = classify(&observation("FERR", "pending", Some("22-322")), &table());
        assert_eq!(result, Classification::default());
    }

    #[test]
    fn lab_abnormality_dominates_ideal_range() {
        let result = classify(&observation("ZN", "5", Some("22-322")), &table());
        assert_eq!(result.status, Some(ClassifierStatus::BelowRefRange));
        assert_eq!(result.ideal_range, None);

        let result = classify(&observation("ZN", "15", Some("1-12")), &table());
        assert_eq!(result.status, Some(ClassifierStatus::AboveRefRange));
        assert_eq!(result.ideal_range, None);
    }

    #[test]
    fn ideal_range_refines_medically_normal_values() {
        let result = classify(&observation("FERR", "35", Some("22-322")), &table());
        assert_eq!(result.status, Some(ClassifierStatus::BelowIdealRange));
        assert_eq!(result.ideal_range.as_deref(), Some("70-100"));

        let result = classify(&observation("ferr", "150", Some("22-322")), &table());
        assert_eq!(result.status, Some(ClassifierStatus::AboveIdealRange));

        let result = classify(&observation("FERR", "80", Some("22-322")), &table());
        assert_eq!(result.status, Some(ClassifierStatus::Normal));
        assert_eq!(result.ideal_range.as_deref(), Some("70-100"));
    }

    #[test]
    fn ideal_range_applies_without_lab_range() {
        let result = classify(&observation("FERR", "50", None), &table());
        assert_eq!(result.status, Some(ClassifierStatus::BelowIdealRange));
    }

    #[test]
    fn lab_range_alone_yields_plain_normal() {
        let result = classify(&observation("NA", "140", Some("135-145")), &table());
        assert_eq!(result, Classification::medical(ClassifierStatus::Normal));

        let result = classify(&observation("BROKEN", "140", Some("135-145")), &table());
        assert_eq!(result, Classification::medical(ClassifierStatus::Normal));
    }

    #[test]
    fn nothing_to_compare_against() {
        let result = classify(&observation("NA", "140", Some("siehe Befund")), &table());
        assert_eq!(result.status, None);
        let result = classify(&observation("NA", "140", None), &table());
        assert_eq!(result.status, None);
    }

    #[test]
    fn cortisol_uses_time_curve_only() {
        let mut obs = observation("CORT", "100", Some("133-537"));
        obs.specimen_collection_time = Some("2023-01-15T18:30:00".into());
        let result = classify(&obs, &table());
        assert_eq!(result, Classification::medical(ClassifierStatus::Normal));

        obs.specimen_collection_time = Some("2023-01-15T08:00:00".into());
        let result = classify(&obs, &table());
        assert_eq!(result.status, Some(ClassifierStatus::BelowRefRange));

        obs.value = "600".into();
        let result = classify(&obs, &table());
        assert_eq!(result.status, Some(ClassifierStatus::AboveRefRange));
    }

    #[test]
    fn cortisol_falls_back_to_observation_time() {
        let mut obs = observation("cort", "100", None);
        obs.observation_datetime = Some("2023-01-15T19:00:00".into());
        let result = classify(&obs, &table());
        assert_eq!(result.status, Some(ClassifierStatus::Normal));
    }

    #[test]
    fn cortisol_without_time_uses_generic_rules() {
        let obs = observation("CORT", "100", Some("133-537"));
        let result = classify(&obs, &table());
        assert_eq!(result.status, Some(ClassifierStatus::BelowRefRange));
    }
}
