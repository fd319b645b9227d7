/// Composite safety factor: alert taxonomy plus visibility, lightning,
/// and precipitation-probability banding.
///
/// Each contribution is [0, 1] and they multiply into a single safety
/// sub-score. A zero from any contribution zeroes the overall score —
/// these are the hard overrides that no otherwise-favorable forecast can
/// outweigh.

use crate::model::{AlertRecord, ConditionsRecord, finite};

// ---------------------------------------------------------------------------
// Alert taxonomy
// ---------------------------------------------------------------------------

/// Danger class of a CAP alert event, from the rowing-safety perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertClass {
    /// Get off the water now: active warnings for conditions that kill.
    ImmediateDanger,
    /// Conditions likely to become dangerous; heavy penalty.
    HighDanger,
    /// Not classified; informational from the rowing perspective.
    Unclassified,
}

/// CAP events that mean immediate danger on the water.
const IMMEDIATE_DANGER_EVENTS: &[&str] = &[
    "Flash Flood Warning",
    "Tornado Warning",
    "Severe Thunderstorm Warning",
    "Flood Warning",
    "Special Marine Warning",
];

/// CAP events indicating elevated, not-yet-immediate danger.
const HIGH_DANGER_EVENTS: &[&str] = &[
    "Flood Watch",
    "Flood Advisory",
    "Tornado Watch",
    "Severe Thunderstorm Watch",
    "Wind Advisory",
    "Small Craft Advisory",
];

/// Classifies a CAP event name. Matching is case-insensitive.
pub fn classify_event(event: &str) -> AlertClass {
    if IMMEDIATE_DANGER_EVENTS
        .iter()
        .any(|e| e.eq_ignore_ascii_case(event))
    {
        AlertClass::ImmediateDanger
    } else if HIGH_DANGER_EVENTS
        .iter()
        .any(|e| e.eq_ignore_ascii_case(event))
    {
        AlertClass::HighDanger
    } else {
        AlertClass::Unclassified
    }
}

fn is_severe_or_extreme(severity: &str) -> bool {
    severity.eq_ignore_ascii_case("Severe") || severity.eq_ignore_ascii_case("Extreme")
}

fn is_immediate(urgency: &str) -> bool {
    urgency.eq_ignore_ascii_case("Immediate")
}

/// Multiplier contributed by a single alert.
///
/// Immediate-danger events zero the score outright when severe/extreme or
/// urgent; otherwise they still take most of the score away. High-danger
/// events penalize by severity. Unclassified events pass through.
pub fn alert_multiplier(alert: &AlertRecord) -> f64 {
    match classify_event(&alert.event) {
        AlertClass::ImmediateDanger => {
            if is_severe_or_extreme(&alert.severity) || is_immediate(&alert.urgency) {
                0.0
            } else {
                0.2
            }
        }
        AlertClass::HighDanger => {
            if is_severe_or_extreme(&alert.severity) {
                0.3
            } else {
                0.6
            }
        }
        AlertClass::Unclassified => 1.0,
    }
}

/// Combined alert contribution: the most restrictive single alert wins.
pub fn alerts_factor(alerts: &[AlertRecord]) -> f64 {
    alerts
        .iter()
        .map(alert_multiplier)
        .fold(1.0, f64::min)
}

// ---------------------------------------------------------------------------
// Visibility
// ---------------------------------------------------------------------------

/// Below this visibility (miles) rowing is blind traffic in a shipping
/// channel: hard zero.
pub const VISIBILITY_EXTREME_MI: f64 = 0.25;

/// Visibility banding, miles. Missing visibility is neutral.
pub fn visibility_factor(visibility: Option<f64>) -> f64 {
    let Some(v) = finite(visibility) else {
        return 1.0;
    };
    if v < VISIBILITY_EXTREME_MI {
        0.0
    } else if v < 1.0 {
        0.3
    } else if v < 3.0 {
        0.7
    } else {
        1.0
    }
}

// ---------------------------------------------------------------------------
// Lightning probability
// ---------------------------------------------------------------------------

/// Above this lightning probability (percent) the score is forced to
/// zero regardless of every other factor.
pub const LIGHTNING_EXTREME_PCT: f64 = 80.0;

/// Lightning-probability banding, percent. Missing probability is neutral.
pub fn lightning_factor(lightning_prob: Option<f64>) -> f64 {
    let Some(p) = finite(lightning_prob) else {
        return 1.0;
    };
    if p > LIGHTNING_EXTREME_PCT {
        0.0
    } else if p > 60.0 {
        0.2
    } else if p > 40.0 {
        0.5
    } else if p > 20.0 {
        0.8
    } else {
        1.0
    }
}

// ---------------------------------------------------------------------------
// Precipitation probability
// ---------------------------------------------------------------------------

/// Precipitation-probability banding, percent. Rain likelihood alone is
/// a comfort problem, not a hazard, so the penalties are mild.
pub fn precip_prob_factor(precip_prob: Option<f64>) -> f64 {
    let Some(p) = finite(precip_prob) else {
        return 1.0;
    };
    if p > 90.0 {
        0.7
    } else if p > 70.0 {
        0.85
    } else if p > 50.0 {
        0.95
    } else {
        1.0
    }
}

// ---------------------------------------------------------------------------
// Composite
// ---------------------------------------------------------------------------

/// The safety sub-score for a conditions record: the product of the
/// alert, visibility, lightning, and precipitation-probability factors.
pub fn safety_factor(record: &ConditionsRecord) -> f64 {
    alerts_factor(&record.alerts)
        * visibility_factor(record.visibility)
        * lightning_factor(record.lightning_prob)
        * precip_prob_factor(record.precip_prob)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
