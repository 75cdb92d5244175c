//! Ideal (hair-health optimality) ranges keyed by biomarker code.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::LabError;

/// Built-in ideal ranges, in lookup order.
const BUILTIN_ENTRIES: &[(&str, &str)] = &[
    ("FERR", "70-100"),
    ("VITD", "40-60"),
    ("B12", "500-900"),
    ("HOLOTC", ">70"),
    ("FOLS", "10-20"),
    ("ZN", "90-120"),
    ("SE", "120-150"),
    ("MG", "0,85-1,0"),
    ("TSH", "0.5-2.5"),
    ("FT3", "3.0-4.2"),
    ("FT4", "1.0-1.5"),
    ("HCY", "<10"),
    ("HBA1C", "<5.5"),
    ("CRP", "<1"),
    ("DHEAS", "150-400"),
    ("SHBG", "30-80"),
];

static BUILTIN: LazyLock<ReferenceTable> = LazyLock::new(|| {
    ReferenceTable::new(
        BUILTIN_ENTRIES
            .iter()
            .map(|(parameter, ideal_range)| ReferenceTableEntry {
                parameter: parameter.to_string(),
                ideal_range: ideal_range.to_string(),
            })
            .collect(),
    )
});

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReferenceTableEntry {
    pub parameter: String,
    pub ideal_range: String,
}

/// Read-only lookup table of ideal ranges.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ReferenceTable {
    entries: Vec<ReferenceTableEntry>,
}

impl ReferenceTable {
    pub fn new(entries: Vec<ReferenceTableEntry>) -> Self {
        Self { entries }
    }

    /// Process-wide table, built on first use.
    pub fn builtin() -> &'static ReferenceTable {
        &BUILTIN
    }

    /// Decode a JSON list of `{parameter, ideal_range}` records.
    pub fn from_json_str(json: &str) -> Result<Self, LabError> {
        let entries: Vec<ReferenceTableEntry> =
            serde_json::from_str(json).map_err(|err| LabError::ReferenceTable(err.to_string()))?;
        Ok(Self::new(entries))
    }

    /// Ideal range for a code. Case-insensitive, first match wins.
    pub fn lookup_ideal(&self, code: &str) -> Option<&str> {
        let wanted = code.trim().to_uppercase();
        if wanted.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|entry| !entry.parameter.is_empty() && entry.parameter.to_uppercase() == wanted)
            .map(|entry| entry.ideal_range.as_str())
    }

    pub fn entries(&self) -> &[ReferenceTableEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
