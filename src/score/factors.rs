/// Per-factor sub-scores for the rowing conditions score.
///
/// Every factor maps a (possibly missing) reading to [0, 1]. The tables
/// below are the single canonical rule set — threshold tuning happens
/// here and nowhere else. Each factor is total: missing or non-numeric
/// input degrades to the documented default, never to a panic.

use crate::model::finite;

// ---------------------------------------------------------------------------
// Segmented exponential decay
// ---------------------------------------------------------------------------

/// Temperature decay table: `(segment start °F, decay rate per °F)`.
///
/// The first segment carries no decay — temperatures between the first
/// two breakpoints score a full 1.0.
pub const TEMP_SEGMENTS: &[(f64, f64)] = &[
    (74.0, 0.0),
    (80.0, 0.03),
    (85.0, 0.09),
    (90.0, 0.13),
    (95.0, 0.28),
    (100.0, 0.40),
];

/// Upper temperature bound, °F. At or above this the score is zero.
pub const TEMP_UPPER_BOUND: f64 = 105.0;

/// Evaluates a segmented exponential decay curve.
///
/// `segments` is an ordered list of `(start, rate)` pairs; each segment
/// runs from its own start to the next segment's start (the last runs to
/// `upper`). The result for a value inside segment `i` is the product of
/// the full decay factor of every earlier segment times the partial decay
/// accumulated inside segment `i` — decay compounds across segments, it
/// does not reset.
///
/// Values below the first breakpoint or at/above `upper` score zero.
pub fn segmented_decay(value: f64, segments: &[(f64, f64)], upper: f64) -> f64 {
    let Some(&(first, _)) = segments.first() else {
        return 0.0;
    };
    if value < first || value >= upper {
        return 0.0;
    }

    let mut accumulated = 1.0;
    for (i, &(start, rate)) in segments.iter().enumerate() {
        let end = segments.get(i + 1).map(|s| s.0).unwrap_or(upper);
        if value < end {
            return accumulated * (-rate * (value - start)).exp();
        }
        accumulated *= (-rate * (end - start)).exp();
    }
    accumulated
}

/// Exponential falloff between an ideal and a poor threshold.
///
/// 1.0 at or below `lo`, 0.0 at or above `hi`, exponential decay in
/// between. Missing readings are neutral.
pub fn exp_fall(value: Option<f64>, lo: f64, hi: f64) -> f64 {
    let Some(v) = finite(value) else {
        return 1.0;
    };
    if v <= lo {
        1.0
    } else if v >= hi {
        0.0
    } else {
        (-2.5 * (v - lo) / (hi - lo)).exp()
    }
}

// ---------------------------------------------------------------------------
// Temperature
// ---------------------------------------------------------------------------

/// Apparent temperature factor. Missing temperature scores zero: without
/// a heat reading there is no basis for calling conditions rowable.
pub fn temperature_factor(apparent_temp: Option<f64>) -> f64 {
    match finite(apparent_temp) {
        Some(t) => segmented_decay(t, TEMP_SEGMENTS, TEMP_UPPER_BOUND),
        None => 0.0,
    }
}

// ---------------------------------------------------------------------------
// Wind
// ---------------------------------------------------------------------------

/// Ideal / poor sustained wind speed thresholds, mph.
pub const WIND_SPEED_IDEAL_MPH: f64 = 5.0;
pub const WIND_SPEED_POOR_MPH: f64 = 25.0;

/// Ideal / poor gust thresholds, mph.
pub const WIND_GUST_IDEAL_MPH: f64 = 10.0;
pub const WIND_GUST_POOR_MPH: f64 = 35.0;

/// Wind factor: the worse of the sustained-speed and gust falloffs.
pub fn wind_factor(wind_speed: Option<f64>, wind_gust: Option<f64>) -> f64 {
    let speed = exp_fall(wind_speed, WIND_SPEED_IDEAL_MPH, WIND_SPEED_POOR_MPH);
    let gust = exp_fall(wind_gust, WIND_GUST_IDEAL_MPH, WIND_GUST_POOR_MPH);
    speed.min(gust)
}

// ---------------------------------------------------------------------------
// Water flow
// ---------------------------------------------------------------------------

/// Discharge at or below this is fully rowable, cfs.
pub const FLOW_GOOD_CFS: f64 = 8000.0;

/// Discharge at or above this is a hard zero, cfs. This is a safety
/// cutoff, not an asymptote.
pub const FLOW_DANGEROUS_CFS: f64 = 13000.0;

/// Conservative factor when discharge is unknown: the river state cannot
/// be verified, so full credit is never given.
pub const FLOW_MISSING_FACTOR: f64 = 0.5;

/// Water flow factor with the hard high-water cutoff.
pub fn flow_factor(discharge: Option<f64>) -> f64 {
    let Some(q) = finite(discharge) else {
        return FLOW_MISSING_FACTOR;
    };
    if q <= FLOW_GOOD_CFS {
        1.0
    } else if q < FLOW_DANGEROUS_CFS {
        (-2.0 * (q - FLOW_GOOD_CFS) / (FLOW_DANGEROUS_CFS - FLOW_GOOD_CFS)).exp()
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Water temperature
// ---------------------------------------------------------------------------

/// Water at or above this is comfortable, °F.
pub const WATER_TEMP_COMFORTABLE_F: f64 = 50.0;

/// Lower edge of the cold-but-manageable band, °F.
pub const WATER_TEMP_COLD_F: f64 = 40.0;

/// Fixed factor inside the cold-but-manageable band.
pub const WATER_TEMP_COLD_FACTOR: f64 = 0.6;

/// Conservative factor when water temperature is unknown. Cold-shock risk
/// cannot be ruled out, so the unknown case takes a moderate penalty
/// rather than full credit.
pub const WATER_TEMP_MISSING_FACTOR: f64 = 0.5;

/// Water temperature factor.
pub fn water_temp_factor(water_temp: Option<f64>) -> f64 {
    let Some(wt) = finite(water_temp) else {
        return WATER_TEMP_MISSING_FACTOR;
    };
    if wt >= WATER_TEMP_COMFORTABLE_F {
        1.0
    } else if wt >= WATER_TEMP_COLD_F {
        WATER_TEMP_COLD_FACTOR
    } else {
        WATER_TEMP_COLD_FACTOR * (-0.15 * (WATER_TEMP_COLD_F - wt)).exp()
    }
}

// ---------------------------------------------------------------------------
// Precipitation
// ---------------------------------------------------------------------------

/// Rain-rate band edges, inches per hour.
pub const PRECIP_MODERATE_IN_HR: f64 = 0.10;
pub const PRECIP_HEAVY_IN_HR: f64 = 0.30;
pub const PRECIP_VERY_HEAVY_IN_HR: f64 = 0.40;

/// Precipitation factor: step-banded above the moderate threshold, a hard
/// zero at the very-heavy band, exponential decay below the lowest band.
/// Missing precipitation reads as dry.
pub fn precipitation_factor(precipitation: Option<f64>) -> f64 {
    let p = finite(precipitation).unwrap_or(0.0).max(0.0);
    if p >= PRECIP_VERY_HEAVY_IN_HR {
        0.0
    } else if p >= PRECIP_HEAVY_IN_HR {
        0.2
    } else if p >= PRECIP_MODERATE_IN_HR {
        0.5
    } else {
        (-6.0 * p).exp()
    }
}

// ---------------------------------------------------------------------------
// UV
// ---------------------------------------------------------------------------

/// UV factor: one fixed multiplier per standard UV-index band. A missing
/// index reads as the best band.
pub fn uv_factor(uv_index: Option<f64>) -> f64 {
    let Some(uv) = finite(uv_index) else {
        return 1.0;
    };
    if uv < 3.0 {
        1.0 // low
    } else if uv < 6.0 {
        0.95 // moderate
    } else if uv < 8.0 {
        0.85 // high
    } else if uv < 11.0 {
        0.70 // very high
    } else {
        0.50 // extreme
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
