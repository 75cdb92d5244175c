//! Status vocabularies and the canonical presentation mapping.
//!
//! The deterministic classifier and the external AI service speak different
//! vocabularies. Both are folded into [`CanonicalStatus`] before display.

use serde::{Deserialize, Serialize};

/// Verdict produced by the deterministic classifier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ClassifierStatus {
    #[serde(rename = "normal")]
    Normal,
    #[serde(rename = "below_refrange")]
    BelowRefRange,
    #[serde(rename = "above_refrange")]
    AboveRefRange,
    #[serde(rename = "below_idealrange")]
    BelowIdealRange,
    #[serde(rename = "above_idealrange")]
    AboveIdealRange,
}

impl ClassifierStatus {
    pub const ALL: [ClassifierStatus; 5] = [
        ClassifierStatus::Normal,
        ClassifierStatus::BelowRefRange,
        ClassifierStatus::AboveRefRange,
        ClassifierStatus::BelowIdealRange,
        ClassifierStatus::AboveIdealRange,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ClassifierStatus::Normal => "normal",
            ClassifierStatus::BelowRefRange => "below_refrange",
            ClassifierStatus::AboveRefRange => "above_refrange",
            ClassifierStatus::BelowIdealRange => "below_idealrange",
            ClassifierStatus::AboveIdealRange => "above_idealrange",
        }
    }

    pub fn from_wire(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == raw)
    }
}

/// Medical status the AI service is instructed to return.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AiStatus {
    Normal,
    Low,
    High,
    CriticalLow,
    CriticalHigh,
}

impl AiStatus {
    pub const ALL: [AiStatus; 5] = [
        AiStatus::Normal,
        AiStatus::Low,
        AiStatus::High,
        AiStatus::CriticalLow,
        AiStatus::CriticalHigh,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AiStatus::Normal => "normal",
            AiStatus::Low => "low",
            AiStatus::High => "high",
            AiStatus::CriticalLow => "critical_low",
            AiStatus::CriticalHigh => "critical_high",
        }
    }

    pub fn from_wire(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == raw)
    }
}

/// Hair-health optimality verdict returned by the AI service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum HairStatus {
    Optimal,
    Suboptimal,
    Concern,
    NotRelevant,
    #[default]
    Unset,
}

impl HairStatus {
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "optimal" => HairStatus::Optimal,
            "suboptimal" => HairStatus::Suboptimal,
            "concern" => HairStatus::Concern,
            "not_relevant" => HairStatus::NotRelevant,
            _ => HairStatus::Unset,
        }
    }
}

/// Display priority in declaration order, most urgent first: `Critical`
/// compares lowest, so ascending sorts put it at the top.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    High,
    Moderate,
    Low,
    Info,
}

/// The single vocabulary used for rendering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalStatus {
    Normal,
    Low,
    High,
    CriticalLow,
    CriticalHigh,
    Suboptimal,
    Supraoptimal,
    Unknown,
}

impl CanonicalStatus {
    /// The seven statuses that carry a verdict.
    pub const KNOWN: [CanonicalStatus; 7] = [
        CanonicalStatus::Normal,
        CanonicalStatus::Low,
        CanonicalStatus::High,
        CanonicalStatus::CriticalLow,
        CanonicalStatus::CriticalHigh,
        CanonicalStatus::Suboptimal,
        CanonicalStatus::Supraoptimal,
    ];

    /// Map a raw status from either vocabulary onto the canonical set.
    pub fn normalize(raw: &str) -> Self {
        if let Some(status) = ClassifierStatus::from_wire(raw) {
            return status.into();
        }
        if let Some(status) = AiStatus::from_wire(raw) {
            return status.into();
        }
        match raw {
            "suboptimal" => CanonicalStatus::Suboptimal,
            "supraoptimal" => CanonicalStatus::Supraoptimal,
            _ => CanonicalStatus::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalStatus::Normal => "normal",
            CanonicalStatus::Low => "low",
            CanonicalStatus::High => "high",
            CanonicalStatus::CriticalLow => "critical_low",
            CanonicalStatus::CriticalHigh => "critical_high",
            CanonicalStatus::Suboptimal => "suboptimal",
            CanonicalStatus::Supraoptimal => "supraoptimal",
            CanonicalStatus::Unknown => "unknown",
        }
    }

    pub fn is_abnormal(self) -> bool {
        !matches!(self, CanonicalStatus::Normal | CanonicalStatus::Unknown)
    }

    pub fn label(self) -> &'static str {
        match self {
            CanonicalStatus::Normal => "Normal",
            CanonicalStatus::Low => "Low",
            CanonicalStatus::High => "High",
            CanonicalStatus::CriticalLow => "Critically low",
            CanonicalStatus::CriticalHigh => "Critically high",
            CanonicalStatus::Suboptimal => "Suboptimal",
            CanonicalStatus::Supraoptimal => "Supraoptimal",
            CanonicalStatus::Unknown => "unknown",
        }
    }

    /// Badge classes for the status pill.
    pub fn color_class(self) -> &'static str {
        match self {
            CanonicalStatus::Normal => "text-green-700 bg-green-50 border-green-200",
            CanonicalStatus::Low
            | CanonicalStatus::High
            | CanonicalStatus::CriticalLow
            | CanonicalStatus::CriticalHigh => "text-red-700 bg-red-50 border-red-200",
            CanonicalStatus::Suboptimal | CanonicalStatus::Supraoptimal => {
                "text-yellow-700 bg-yellow-50 border-yellow-200"
            }
            CanonicalStatus::Unknown => "text-gray-600 bg-gray-50 border-gray-200",
        }
    }

    /// Table row highlight, empty when the row is not highlighted.
    pub fn row_background(self) -> &'static str {
        match self {
            CanonicalStatus::Low
            | CanonicalStatus::High
            | CanonicalStatus::CriticalLow
            | CanonicalStatus::CriticalHigh => "bg-red-50/60",
            CanonicalStatus::Suboptimal | CanonicalStatus::Supraoptimal => "bg-yellow-50/60",
            CanonicalStatus::Normal | CanonicalStatus::Unknown => "",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            CanonicalStatus::CriticalLow | CanonicalStatus::CriticalHigh => Severity::Critical,
            CanonicalStatus::Low | CanonicalStatus::High => Severity::High,
            CanonicalStatus::Suboptimal | CanonicalStatus::Supraoptimal => Severity::Moderate,
            CanonicalStatus::Normal => Severity::Low,
            CanonicalStatus::Unknown => Severity::Info,
        }
    }
}

impl From<ClassifierStatus> for CanonicalStatus {
    fn from(status: ClassifierStatus) -> Self {
        match status {
            ClassifierStatus::Normal => CanonicalStatus::Normal,
            ClassifierStatus::BelowRefRange => CanonicalStatus::Low,
            ClassifierStatus::AboveRefRange => CanonicalStatus::High,
            ClassifierStatus::BelowIdealRange => CanonicalStatus::Suboptimal,
            ClassifierStatus::AboveIdealRange => CanonicalStatus::Supraoptimal,
        }
    }
}

impl From<AiStatus> for CanonicalStatus {
    fn from(status: AiStatus) -> Self {
        match status {
            AiStatus::Normal => CanonicalStatus::Normal,
            AiStatus::Low => CanonicalStatus::Low,
            AiStatus::High => CanonicalStatus::High,
            AiStatus::CriticalLow => CanonicalStatus::CriticalLow,
            AiStatus::CriticalHigh => CanonicalStatus::CriticalHigh,
        }
    }
}

/// True unless the raw status normalizes to `normal` or `unknown`.
pub fn is_status_abnormal(raw: &str) -> bool {
    CanonicalStatus::normalize(raw).is_abnormal()
}

/// Serializes an optional classifier verdict as its wire string, `""` for none.
pub mod wire {
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::ClassifierStatus;

    pub fn serialize<S>(status: &Option<ClassifierStatus>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(status.map_or("", ClassifierStatus::as_str))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<ClassifierStatus>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() {
            return Ok(None);
        }
        ClassifierStatus::from_wire(&raw)
            .map(Some)
            .ok_or_else(|| de::Error::unknown_variant(&raw, WIRE_NAMES))
    }

    const WIRE_NAMES: &[&str] = &[
        "",
        "normal",
        "below_refrange",
        "above_refrange",
        "below_idealrange",
        "above_idealrange",
    ];
}
