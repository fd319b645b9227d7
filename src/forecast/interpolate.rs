/// Resampling of irregular external forecast series onto a fixed cadence.
///
/// The national river forecast arrives at a coarse, uneven cadence
/// (typically 6-hourly); downstream scoring wants a regular grid. Output
/// points strictly inside the input span are linearly interpolated and
/// marked observed; points outside it are clamped to the nearest edge
/// value and marked not-observed, so consumers can tell a real
/// interpolation from a held-constant edge.

use chrono::{DateTime, Duration, Utc};

use crate::model::HistoricalSample;

/// One output point of a resampled series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResampledPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    /// True when the timestamp falls within the input series' time span
    /// (boundary samples included); false when edge-clamped.
    pub observed: bool,
}

/// Sorted, corrupt-free copy of an input series.
fn sanitize(series: &[HistoricalSample]) -> Vec<HistoricalSample> {
    let mut clean: Vec<HistoricalSample> = series
        .iter()
        .filter(|s| s.value.is_finite())
        .copied()
        .collect();
    clean.sort_by_key(|s| s.timestamp);
    clean
}

/// Evaluates a sanitized series at one timestamp.
///
/// Returns `(value, observed)`, or `None` for an empty series.
fn evaluate(clean: &[HistoricalSample], at: DateTime<Utc>) -> Option<(f64, bool)> {
    let first = clean.first()?;
    let last = clean.last()?;

    if at < first.timestamp {
        return Some((first.value, false));
    }
    if at > last.timestamp {
        return Some((last.value, false));
    }

    // Bracket `at` between consecutive samples and interpolate.
    let idx = clean.partition_point(|s| s.timestamp <= at);
    let lo = clean[idx.saturating_sub(1)];
    if idx >= clean.len() || lo.timestamp == at {
        return Some((lo.value, true));
    }
    let hi = clean[idx];

    let span_secs = (hi.timestamp - lo.timestamp).num_seconds();
    if span_secs == 0 {
        return Some((lo.value, true));
    }
    let fraction = (at - lo.timestamp).num_seconds() as f64 / span_secs as f64;
    Some((lo.value + fraction * (hi.value - lo.value), true))
}

/// Evaluates an unsanitized series at a single timestamp.
///
/// Used by the forecast pipeline for per-horizon-point lookups; `None`
/// means the series was empty (or all samples were corrupt).
pub fn value_at(series: &[HistoricalSample], at: DateTime<Utc>) -> Option<(f64, bool)> {
    evaluate(&sanitize(series), at)
}

/// Resamples a series onto a fixed cadence.
///
/// Output timestamps are `start, start+step, ...` up to and including
/// `start+horizon`. An empty input (or a non-positive step) produces an
/// empty output rather than an error — the caller simply has nothing to
/// score at this cadence.
pub fn resample(
    series: &[HistoricalSample],
    start: DateTime<Utc>,
    step: Duration,
    horizon: Duration,
) -> Vec<ResampledPoint> {
    let clean = sanitize(series);
    if clean.is_empty() || step <= Duration::zero() {
        return Vec::new();
    }

    let end = start + horizon;
    let mut out = Vec::new();
    let mut at = start;
    while at <= end {
        if let Some((value, observed)) = evaluate(&clean, at) {
            out.push(ResampledPoint { timestamp: at, value, observed });
        }
        at += step;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
    }

    fn sample(offset_hours: i64, value: f64) -> HistoricalSample {
        HistoricalSample {
            timestamp: t0() + Duration::hours(offset_hours),
            value,
        }
    }

    #[test]
    fn test_midpoint_interpolation_is_observed() {
        // Inputs at t0 (100) and t0+6h (160): t0+3h interpolates to 130.
        let series = vec![sample(0, 100.0), sample(6, 160.0)];
        let (value, observed) = value_at(&series, t0() + Duration::hours(3)).unwrap();
        assert_eq!(value, 130.0);
        assert!(observed);
    }

    #[test]
    fn test_past_the_end_clamps_and_clears_observed() {
        let series = vec![sample(0, 100.0), sample(6, 160.0)];
        let (value, observed) = value_at(&series, t0() + Duration::hours(10)).unwrap();
        assert_eq!(value, 160.0);
        assert!(!observed);
    }

    #[test]
    fn test_before_the_start_clamps_to_first_value() {
        let series = vec![sample(2, 100.0), sample(8, 160.0)];
        let (value, observed) = value_at(&series, t0()).unwrap();
        assert_eq!(value, 100.0);
        assert!(!observed);
    }

    #[test]
    fn test_exact_boundary_timestamps_count_as_observed() {
        let series = vec![sample(0, 100.0), sample(6, 160.0)];
        let (first, first_obs) = value_at(&series, t0()).unwrap();
        let (last, last_obs) = value_at(&series, t0() + Duration::hours(6)).unwrap();
        assert_eq!(first, 100.0);
        assert_eq!(last, 160.0);
        assert!(first_obs && last_obs);
    }

    #[test]
    fn test_hourly_resample_of_six_hourly_input() {
        let series = vec![sample(0, 100.0), sample(6, 160.0), sample(12, 130.0)];
        let points = resample(&series, t0(), Duration::hours(1), Duration::hours(12));
        assert_eq!(points.len(), 13);
        assert_eq!(points[0].value, 100.0);
        assert_eq!(points[3].value, 130.0);
        assert_eq!(points[6].value, 160.0);
        assert_eq!(points[9].value, 145.0); // halfway back down
        assert_eq!(points[12].value, 130.0);
        assert!(points.iter().all(|p| p.observed));
    }

    #[test]
    fn test_resample_flags_edge_clamped_tail() {
        // Horizon extends 4 hours past the last input sample.
        let series = vec![sample(0, 100.0), sample(6, 160.0)];
        let points = resample(&series, t0(), Duration::hours(1), Duration::hours(10));
        assert_eq!(points.len(), 11);
        for p in &points[..7] {
            assert!(p.observed, "point at {} should be observed", p.timestamp);
        }
        for p in &points[7..] {
            assert!(!p.observed, "point at {} should be clamped", p.timestamp);
            assert_eq!(p.value, 160.0);
        }
    }

    #[test]
    fn test_empty_series_produces_empty_output() {
        assert!(resample(&[], t0(), Duration::hours(1), Duration::hours(6)).is_empty());
        assert_eq!(value_at(&[], t0()), None);
    }

    #[test]
    fn test_all_corrupt_series_treated_as_empty() {
        let series = vec![
            HistoricalSample { timestamp: t0(), value: f64::NAN },
            HistoricalSample { timestamp: t0() + Duration::hours(6), value: f64::INFINITY },
        ];
        assert_eq!(value_at(&series, t0() + Duration::hours(3)), None);
    }

    #[test]
    fn test_unsorted_input_is_sorted_before_interpolation() {
        let series = vec![sample(6, 160.0), sample(0, 100.0)];
        let (value, observed) = value_at(&series, t0() + Duration::hours(3)).unwrap();
        assert_eq!(value, 130.0);
        assert!(observed);
    }

    #[test]
    fn test_single_sample_series_clamps_everywhere_except_its_instant() {
        let series = vec![sample(3, 42.0)];
        let (before, before_obs) = value_at(&series, t0()).unwrap();
        let (at, at_obs) = value_at(&series, t0() + Duration::hours(3)).unwrap();
        let (after, after_obs) = value_at(&series, t0() + Duration::hours(9)).unwrap();
        assert_eq!((before, at, after), (42.0, 42.0, 42.0));
        assert!(!before_obs);
        assert!(at_obs);
        assert!(!after_obs);
    }

    #[test]
    fn test_non_positive_step_yields_empty_output() {
        let series = vec![sample(0, 100.0), sample(6, 160.0)];
        let points = resample(&series, t0(), Duration::zero(), Duration::hours(6));
        assert!(points.is_empty());
    }
}
