//! Time-of-day reference intervals for serum cortisol.
//!
//! Two published anchors (morning and evening draw) bound the curve. Between
//! them each bound is interpolated linearly; outside them the nearest anchor
//! applies unchanged.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::range::Interval;

static CLOCK_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"T([0-9]{2}):([0-9]{2})").unwrap());

struct Anchor {
    hour: f64,
    optimal_min: f64,
    optimal_max: f64,
    standard_min: f64,
    standard_max: f64,
}

const EARLY: Anchor = Anchor {
    hour: 9.5,
    optimal_min: 128.3,
    optimal_max: 321.7,
    standard_min: 133.0,
    standard_max: 537.0,
};

const LATE: Anchor = Anchor {
    hour: 18.5,
    optimal_min: 58.3,
    optimal_max: 151.7,
    standard_min: 57.4,
    standard_max: 292.0,
};

/// Which anchor, if any, the requested hour was clamped to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Capping {
    Early,
    Late,
    NotCapped,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CortisolRange {
    pub optimal_min: f64,
    pub optimal_max: f64,
    pub standard_min: f64,
    pub standard_max: f64,
    pub time_used: f64,
    pub capping: Capping,
}

impl CortisolRange {
    fn from_anchor(anchor: &Anchor, time_used: f64, capping: Capping) -> Self {
        Self {
            optimal_min: anchor.optimal_min,
            optimal_max: anchor.optimal_max,
            standard_min: anchor.standard_min,
            standard_max: anchor.standard_max,
            time_used,
            capping,
        }
    }

    pub fn standard_interval(&self) -> Interval {
        Interval::closed(self.standard_min, self.standard_max)
    }

    /// Standard interval as a lab-style range string, one decimal place.
    pub fn standard_range_string(&self) -> String {
        format!("{:.1}-{:.1}", self.standard_min, self.standard_max)
    }
}

/// Reference interval for a decimal clock hour. Non-finite input yields `None`.
pub fn cortisol_range_at(hour: f64) -> Option<CortisolRange> {
    if !hour.is_finite() {
        return None;
    }

    if hour <= EARLY.hour {
        return Some(CortisolRange::from_anchor(&EARLY, hour, Capping::Early));
    }
    if hour >= LATE.hour {
        return Some(CortisolRange::from_anchor(&LATE, hour, Capping::Late));
    }

    let lerp = |early: f64, late: f64| {
        early + (hour - EARLY.hour) * (late - early) / (LATE.hour - EARLY.hour)
    };

    Some(CortisolRange {
        optimal_min: lerp(EARLY.optimal_min, LATE.optimal_min),
        optimal_max: lerp(EARLY.optimal_max, LATE.optimal_max),
        standard_min: lerp(EARLY.standard_min, LATE.standard_min),
        standard_max: lerp(EARLY.standard_max, LATE.standard_max),
        time_used: hour,
        capping: Capping::NotCapped,
    })
}

/// Decimal hour from the first `Thh:mm` in a timestamp string.
pub fn hour_from_timestamp(timestamp: &str) -> Option<f64> {
    let captures = CLOCK_TIME.captures(timestamp)?;
    let hours: f64 = captures[1].parse().ok()?;
    let minutes: f64 = captures[2].parse().ok()?;
    Some(hours + minutes / 60.0)
}
