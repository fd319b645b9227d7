/// Short-horizon linear extrapolation of sparse gauge history.
///
/// USGS readings arrive at irregular 15-minute-ish intervals; the
/// projector takes the slope of the two most recent samples and extends
/// it to a target time, but only inside a bounded horizon of the last
/// sample. Beyond the horizon — in either temporal direction — the last
/// known value is held constant (persistence), because a quarter-hour
/// slope says nothing trustworthy about tomorrow.
///
/// # Clock injection
/// The target time is an explicit parameter; nothing here reads the
/// system clock. Projection is purely deterministic in tests.

use chrono::{DateTime, Utc};

use crate::model::HistoricalSample;

/// Maximum distance from the last sample, in seconds, at which the slope
/// is still trusted (3 hours).
pub const EXTRAPOLATION_HORIZON_SECS: i64 = 3 * 3600;

/// Samples older than the most recent this-many are discarded before
/// projecting; ancient history only destabilizes a two-point slope.
pub const MAX_SAMPLES: usize = 24;

/// Projects one metric's value at `target`.
///
/// Returns `current` unchanged when projection cannot or should not
/// fire: fewer than two usable samples, a zero time delta between the
/// two most recent samples, a target beyond the horizon, or a missing
/// current value. Corrupt (non-finite) samples are skipped individually
/// rather than aborting the metric. Never panics.
pub fn project(
    samples: &[HistoricalSample],
    current: Option<f64>,
    target: DateTime<Utc>,
) -> Option<f64> {
    let current = crate::model::finite(current);

    // Sanitize: drop corrupt samples, sort defensively, keep the recent tail.
    let mut clean: Vec<HistoricalSample> = samples
        .iter()
        .filter(|s| s.value.is_finite())
        .copied()
        .collect();
    clean.sort_by_key(|s| s.timestamp);
    if clean.len() > MAX_SAMPLES {
        clean.drain(..clean.len() - MAX_SAMPLES);
    }

    let current_value = current?;
    if clean.len() < 2 {
        return Some(current_value);
    }

    let last = clean[clean.len() - 1];
    let prev = clean[clean.len() - 2];

    let dt_secs = (last.timestamp - prev.timestamp).num_seconds();
    if dt_secs == 0 {
        // Duplicate timestamps: slope undefined.
        return Some(current_value);
    }
    let slope = (last.value - prev.value) / dt_secs as f64;

    let offset_secs = (target - last.timestamp).num_seconds();
    if offset_secs.abs() > EXTRAPOLATION_HORIZON_SECS {
        return Some(current_value);
    }

    let projected = last.value + slope * offset_secs as f64;
    if projected.is_finite() {
        Some(projected)
    } else {
        Some(current_value)
    }
}
