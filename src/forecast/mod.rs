/// Forecast pipeline: projects conditions across future horizons and
/// scores each point.
///
/// For every target timestamp the pipeline assembles per-source snapshots
/// (resampled weather forecast, trend-projected water metrics, and the
/// resampled national river forecast where it covers the timestamp),
/// fuses them under the fixed precedence, and runs the scoring engine.
/// The components are pure; "now" is always an explicit argument.
///
/// Submodules:
/// - `trend` — bounded-horizon linear extrapolation of gauge history.
/// - `interpolate` — fixed-cadence resampling of irregular series.
/// - `fusion` — precedence merge of per-source snapshots.

pub mod fusion;
pub mod interpolate;
pub mod trend;

use chrono::{DateTime, Duration, Utc};

use crate::model::{
    AlertRecord, ConditionsRecord, ForecastPoint, ForecastPointSummary, HistoricalSample,
    StageflowSeries, WaterHistory, WeatherForecastEntry, finite,
};
use crate::score;
use fusion::{FusedConditions, SourceSnapshot};

// ---------------------------------------------------------------------------
// Production cadences
// ---------------------------------------------------------------------------

/// Short-term horizon: 15-minute steps over the next 6 hours.
pub const SHORT_TERM_STEP_MINUTES: i64 = 15;
pub const SHORT_TERM_HORIZON_HOURS: i64 = 6;

/// Standard horizon: hourly over the next 48 hours.
pub const STANDARD_STEP_HOURS: i64 = 1;
pub const STANDARD_HORIZON_HOURS: i64 = 48;

/// Extended horizon: hourly over the next 7 days (the 6-hourly river
/// forecast is resampled down to this cadence).
pub const EXTENDED_STEP_HOURS: i64 = 1;
pub const EXTENDED_HORIZON_DAYS: i64 = 7;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Everything one pipeline invocation reads. All borrowed, all immutable;
/// the acquisition layer replaces these wholesale each refresh cycle.
#[derive(Debug, Clone, Copy)]
pub struct ForecastInputs<'a> {
    /// Hourly entries from the meteorological source.
    pub weather: &'a [WeatherForecastEntry],
    /// Recent per-metric gauge history for trend projection.
    pub water_history: &'a WaterHistory,
    /// Latest live water snapshot (persistence fallback values).
    pub current_water: &'a ConditionsRecord,
    /// National river forecast, if a current one is available.
    pub stageflow: Option<&'a StageflowSeries>,
    /// Active alerts; applied across the whole horizon.
    pub alerts: &'a [AlertRecord],
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Builds one scored point at `at`.
pub fn forecast_point(inputs: &ForecastInputs<'_>, at: DateTime<Utc>) -> ForecastPoint {
    let mut snapshots: Vec<SourceSnapshot> = Vec::with_capacity(3);

    // River forecast outranks trend projection at forecast timestamps —
    // it is an actual hydrological forecast, not a 15-minute slope — but
    // only where it genuinely covers the timestamp. Edge-clamped values
    // fall through to projection instead.
    if let Some(sf) = inputs.stageflow {
        let mut record = ConditionsRecord::default();
        if let Some((flow, true)) = interpolate::value_at(&sf.flow, at) {
            record.discharge = Some(flow);
        }
        if let Some((stage, true)) = interpolate::value_at(&sf.stage, at) {
            record.gauge_height = Some(stage);
        }
        if record.discharge.is_some() || record.gauge_height.is_some() {
            snapshots.push(SourceSnapshot::external(record));
        }
    }

    snapshots.push(SourceSnapshot::primary(projected_water(inputs, at)));
    snapshots.push(SourceSnapshot::primary(weather_at(inputs, at)));

    let fused = fusion::fuse(&snapshots);
    let score = score::compute_score(&fused.record);
    ForecastPoint {
        timestamp: at,
        conditions: fused.record,
        score,
        stageflow_used: fused.external_used,
    }
}

/// Builds a scored, strictly time-ordered forecast at a fixed cadence
/// from `start` through `start + horizon` inclusive.
pub fn build_forecast(
    inputs: &ForecastInputs<'_>,
    start: DateTime<Utc>,
    step: Duration,
    horizon: Duration,
) -> Vec<ForecastPoint> {
    if step <= Duration::zero() {
        return Vec::new();
    }
    let end = start + horizon;
    let mut points = Vec::new();
    let mut at = start;
    while at <= end {
        points.push(forecast_point(inputs, at));
        at += step;
    }
    points
}

pub fn build_short_term(inputs: &ForecastInputs<'_>, now: DateTime<Utc>) -> Vec<ForecastPoint> {
    build_forecast(
        inputs,
        now,
        Duration::minutes(SHORT_TERM_STEP_MINUTES),
        Duration::hours(SHORT_TERM_HORIZON_HOURS),
    )
}

pub fn build_standard(inputs: &ForecastInputs<'_>, now: DateTime<Utc>) -> Vec<ForecastPoint> {
    build_forecast(
        inputs,
        now,
        Duration::hours(STANDARD_STEP_HOURS),
        Duration::hours(STANDARD_HORIZON_HOURS),
    )
}

pub fn build_extended(inputs: &ForecastInputs<'_>, now: DateTime<Utc>) -> Vec<ForecastPoint> {
    build_forecast(
        inputs,
        now,
        Duration::hours(EXTENDED_STEP_HOURS),
        Duration::days(EXTENDED_HORIZON_DAYS),
    )
}

/// Fuses the live snapshots for the "current score" path: the gauge
/// reading is primary, the weather snapshot fills its own fields, and
/// the latest observed stage/flow from the forecasting source backstops
/// gauge outages (flagged as external).
pub fn current_conditions(
    weather: &ConditionsRecord,
    water: &ConditionsRecord,
    stageflow_observed: Option<&ConditionsRecord>,
) -> FusedConditions {
    let mut snapshots = vec![
        SourceSnapshot::primary(water.clone()),
        SourceSnapshot::primary(weather.clone()),
    ];
    if let Some(observed) = stageflow_observed {
        snapshots.push(SourceSnapshot::external(observed.clone()));
    }
    fusion::fuse(&snapshots)
}

/// Reduces detailed points to the timestamp-and-score view.
pub fn summarize(points: &[ForecastPoint]) -> Vec<ForecastPointSummary> {
    points
        .iter()
        .map(|p| ForecastPointSummary {
            timestamp: p.timestamp,
            score: p.score.score,
            stageflow_used: p.stageflow_used,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Snapshot assembly
// ---------------------------------------------------------------------------

/// Trend-projects the three water metrics to `at` from gauge history,
/// falling back to the current snapshot values beyond the horizon.
fn projected_water(inputs: &ForecastInputs<'_>, at: DateTime<Utc>) -> ConditionsRecord {
    let history = inputs.water_history;
    let current = inputs.current_water;
    ConditionsRecord {
        discharge: trend::project(&history.discharge, current.discharge, at),
        gauge_height: trend::project(&history.gauge_height, current.gauge_height, at),
        water_temp: trend::project(&history.water_temp, current.water_temp, at),
        ..Default::default()
    }
}

/// Resamples the hourly weather entries onto `at`, one numeric field at
/// a time, and attaches the active alerts.
fn weather_at(inputs: &ForecastInputs<'_>, at: DateTime<Utc>) -> ConditionsRecord {
    let entries = inputs.weather;
    ConditionsRecord {
        apparent_temp: weather_field_at(entries, |r| r.apparent_temp, at),
        wind_speed: weather_field_at(entries, |r| r.wind_speed, at),
        wind_gust: weather_field_at(entries, |r| r.wind_gust, at),
        precipitation: weather_field_at(entries, |r| r.precipitation, at),
        uv_index: weather_field_at(entries, |r| r.uv_index, at),
        visibility: weather_field_at(entries, |r| r.visibility, at),
        lightning_prob: weather_field_at(entries, |r| r.lightning_prob, at),
        precip_prob: weather_field_at(entries, |r| r.precip_prob, at),
        alerts: inputs.alerts.to_vec(),
        ..Default::default()
    }
}

fn weather_field_at(
    entries: &[WeatherForecastEntry],
    get: fn(&ConditionsRecord) -> Option<f64>,
    at: DateTime<Utc>,
) -> Option<f64> {
    let series: Vec<HistoricalSample> = entries
        .iter()
        .filter_map(|e| {
            finite(get(&e.record)).map(|value| HistoricalSample {
                timestamp: e.timestamp,
                value,
            })
        })
        .collect();
    interpolate::value_at(&series, at).map(|(value, _)| value)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 0).unwrap()
    }

    fn hourly_weather(hours: i64) -> Vec<WeatherForecastEntry> {
        (0..=hours)
            .map(|h| WeatherForecastEntry {
                timestamp: t0() + Duration::hours(h),
                record: ConditionsRecord {
                    apparent_temp: Some(76.0),
                    wind_speed: Some(4.0),
                    wind_gust: Some(7.0),
                    precipitation: Some(0.0),
                    uv_index: Some(2.0),
                    visibility: Some(10.0),
                    lightning_prob: Some(0.0),
                    precip_prob: Some(5.0),
                    ..Default::default()
                },
            })
            .collect()
    }

    fn flat_history(value: f64) -> Vec<HistoricalSample> {
        (0..8)
            .map(|i| HistoricalSample {
                timestamp: t0() - Duration::minutes(15 * (8 - i)),
                value,
            })
            .collect()
    }

    fn calm_inputs_history() -> (Vec<WeatherForecastEntry>, WaterHistory, ConditionsRecord) {
        let weather = hourly_weather(48);
        let history = WaterHistory {
            discharge: flat_history(5000.0),
            gauge_height: flat_history(7.0),
            water_temp: flat_history(62.0),
        };
        let current = ConditionsRecord {
            discharge: Some(5000.0),
            gauge_height: Some(7.0),
            water_temp: Some(62.0),
            ..Default::default()
        };
        (weather, history, current)
    }

    #[test]
    fn test_points_are_time_ordered_at_the_requested_cadence() {
        let (weather, history, current) = calm_inputs_history();
        let inputs = ForecastInputs {
            weather: &weather,
            water_history: &history,
            current_water: &current,
            stageflow: None,
            alerts: &[],
        };
        let points = build_short_term(&inputs, t0());
        assert_eq!(points.len(), 25); // 6h at 15-min steps, inclusive
        for pair in points.windows(2) {
            assert_eq!(
                pair[1].timestamp - pair[0].timestamp,
                Duration::minutes(15)
            );
        }
    }

    #[test]
    fn test_calm_conditions_forecast_scores_high_throughout() {
        let (weather, history, current) = calm_inputs_history();
        let inputs = ForecastInputs {
            weather: &weather,
            water_history: &history,
            current_water: &current,
            stageflow: None,
            alerts: &[],
        };
        for point in build_standard(&inputs, t0()) {
            assert!(
                point.score.score >= 9.0,
                "calm conditions scored {} at {}",
                point.score.score,
                point.timestamp
            );
            assert!(!point.stageflow_used);
        }
    }

    #[test]
    fn test_stageflow_outranks_projection_where_it_covers() {
        let (weather, history, current) = calm_inputs_history();
        // River forecast says the flow spikes to dangerous levels.
        let stageflow = StageflowSeries {
            stage: vec![],
            flow: vec![
                HistoricalSample { timestamp: t0(), value: 14000.0 },
                HistoricalSample {
                    timestamp: t0() + Duration::hours(12),
                    value: 14000.0,
                },
            ],
        };
        let inputs = ForecastInputs {
            weather: &weather,
            water_history: &history,
            current_water: &current,
            stageflow: Some(&stageflow),
            alerts: &[],
        };
        let point = forecast_point(&inputs, t0() + Duration::hours(6));
        assert_eq!(point.conditions.discharge, Some(14000.0));
        assert!(point.stageflow_used);
        assert_eq!(point.score.score, 0.0); // hard flow cutoff
    }

    #[test]
    fn test_beyond_stageflow_span_falls_back_to_projection() {
        let (weather, history, current) = calm_inputs_history();
        let stageflow = StageflowSeries {
            stage: vec![],
            flow: vec![
                HistoricalSample { timestamp: t0(), value: 14000.0 },
                HistoricalSample {
                    timestamp: t0() + Duration::hours(2),
                    value: 14000.0,
                },
            ],
        };
        let inputs = ForecastInputs {
            weather: &weather,
            water_history: &history,
            current_water: &current,
            stageflow: Some(&stageflow),
            alerts: &[],
        };
        // 12 hours out the river forecast has expired; projection (which
        // persists at the current 5000 cfs) takes over.
        let point = forecast_point(&inputs, t0() + Duration::hours(12));
        assert_eq!(point.conditions.discharge, Some(5000.0));
        assert!(!point.stageflow_used);
    }

    #[test]
    fn test_active_alerts_apply_across_the_horizon() {
        let (weather, history, current) = calm_inputs_history();
        let alerts = vec![AlertRecord {
            event: "Flash Flood Warning".to_string(),
            severity: "Severe".to_string(),
            urgency: "Immediate".to_string(),
        }];
        let inputs = ForecastInputs {
            weather: &weather,
            water_history: &history,
            current_water: &current,
            stageflow: None,
            alerts: &alerts,
        };
        for point in build_short_term(&inputs, t0()) {
            assert_eq!(point.score.score, 0.0);
        }
    }

    #[test]
    fn test_empty_inputs_still_produce_scored_points() {
        let history = WaterHistory::default();
        let current = ConditionsRecord::default();
        let inputs = ForecastInputs {
            weather: &[],
            water_history: &history,
            current_water: &current,
            stageflow: None,
            alerts: &[],
        };
        let points = build_short_term(&inputs, t0());
        assert_eq!(points.len(), 25);
        for point in points {
            assert!(point.score.score.is_finite());
            assert!((0.0..=10.0).contains(&point.score.score));
        }
    }

    #[test]
    fn test_current_conditions_prefers_live_gauge_over_observed_stageflow() {
        let water = ConditionsRecord {
            discharge: Some(8100.0),
            gauge_height: Some(7.1),
            ..Default::default()
        };
        let weather = ConditionsRecord {
            apparent_temp: Some(75.0),
            ..Default::default()
        };
        let observed = ConditionsRecord {
            discharge: Some(8600.0),
            gauge_height: Some(7.4),
            ..Default::default()
        };
        let fused = current_conditions(&weather, &water, Some(&observed));
        assert_eq!(fused.record.discharge, Some(8100.0));
        assert!(!fused.external_used);

        // With the gauge dark, the observed stageflow backstops it.
        let dark = ConditionsRecord::default();
        let fused = current_conditions(&weather, &dark, Some(&observed));
        assert_eq!(fused.record.discharge, Some(8600.0));
        assert!(fused.external_used);
    }

    #[test]
    fn test_summary_mirrors_detailed_points() {
        let (weather, history, current) = calm_inputs_history();
        let inputs = ForecastInputs {
            weather: &weather,
            water_history: &history,
            current_water: &current,
            stageflow: None,
            alerts: &[],
        };
        let points = build_short_term(&inputs, t0());
        let summaries = summarize(&points);
        assert_eq!(points.len(), summaries.len());
        for (p, s) in points.iter().zip(&summaries) {
            assert_eq!(p.timestamp, s.timestamp);
            assert_eq!(p.score.score, s.score);
            assert_eq!(p.stageflow_used, s.stageflow_used);
        }
    }
}
