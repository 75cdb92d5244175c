//! Reference range strings (`a-b`, `>a`, `<a`) and numeric value extraction.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static LEADING_FLOAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?([0-9]+\.?[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?").unwrap());

static DASH_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9.,]+)\s*[-–]\s*([0-9.,]+)$").unwrap());

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IntervalKind {
    Range,
    GreaterThan,
    LessThan,
}

/// Numeric interval; unbounded sides are infinite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
    pub kind: IntervalKind,
}

impl Interval {
    pub fn closed(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            kind: IntervalKind::Range,
        }
    }

    /// Inclusive on finite bounds.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Parse a reference range string. Anything unrecognized yields `None`.
pub fn parse_range(raw: &str) -> Option<Interval> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(rest) = trimmed.strip_prefix('>') {
        let min = leading_float(rest)?;
        return Some(Interval {
            min,
            max: f64::INFINITY,
            kind: IntervalKind::GreaterThan,
        });
    }

    if let Some(rest) = trimmed.strip_prefix('<') {
        let max = leading_float(rest)?;
        return Some(Interval {
            min: f64::NEG_INFINITY,
            max,
            kind: IntervalKind::LessThan,
        });
    }

    let captures = DASH_RANGE.captures(trimmed)?;
    let min = leading_float(&decimal_point(&captures[1]))?;
    let max = leading_float(&decimal_point(&captures[2]))?;
    Some(Interval::closed(min, max))
}

/// Extract a number from an observation value such as `"12,5 mg/dL"`.
pub fn parse_numeric_value(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();
    leading_float(&decimal_point(&cleaned))
}

// Only the first comma is a decimal separator.
fn decimal_point(raw: &str) -> String {
    raw.replacen(',', ".", 1)
}

/// Longest numeric prefix after leading whitespace, like a lenient float read.
fn leading_float(raw: &str) -> Option<f64> {
    let found = LEADING_FLOAT.find(raw.trim_start())?;
    found.as_str().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_range() {
        let interval = parse_range("22-322").unwrap();
        assert_eq!(interval, Interval::closed(22.0, 322.0));
    }

    #[test]
    fn closed_range_with_en_dash_spaces_and_commas() {
        let interval = parse_range(" 3,5 – 5,1 ").unwrap();
        assert_eq!(interval.min, 3.5);
        assert_eq!(interval.max, 5.1);
        assert_eq!(interval.kind, IntervalKind::Range);
    }

    #[test]
    fn open_ranges() {
        let above = parse_range(">100").unwrap();
        assert_eq!(above.min, 100.0);
        assert_eq!(above.max, f64::INFINITY);
        assert_eq!(above.kind, IntervalKind::GreaterThan);

        let below = parse_range("< 5.7").unwrap();
        assert_eq!(below.min, f64::NEG_INFINITY);
        assert_eq!(below.max, 5.7);
        assert_eq!(below.kind, IntervalKind::LessThan);
    }

    #[test]
    fn unusable_ranges() {
        assert_eq!(parse_range("not a range"), None);
        assert_eq!(parse_range(""), None);
        assert_eq!(parse_range("   "), None);
        assert_eq!(parse_range(">abc"), None);
        assert_eq!(parse_range("<"), None);
        assert_eq!(parse_range("negativ"), None);
    }

    #[test]
    fn containment_is_inclusive() {
        let interval = Interval::closed(22.0, 322.0);
        assert!(interval.contains(22.0));
        assert!(interval.contains(322.0));
        assert!(!interval.contains(21.99));
        assert!(parse_range(">100").unwrap().contains(1e12));
    }

    #[test]
    fn numeric_values() {
        assert_eq!(parse_numeric_value("12,5 mg/dL"), Some(12.5));
        assert_eq!(parse_numeric_value("35"), Some(35.0));
        assert_eq!(parse_numeric_value("<5"), Some(5.0));
        assert_eq!(parse_numeric_value("-2.5"), Some(-2.5));
        assert_eq!(parse_numeric_value("abc"), None);
        assert_eq!(parse_numeric_value(""), None);
        assert_eq!(parse_numeric_value("-"), None);
    }
}
