//! Forecast Pipeline Integration Tests
//!
//! Exercises the projector, interpolator, fusion, and pipeline together
//! on realistic multi-source inputs, including the projector and
//! interpolator reference cases the serving layer depends on.

use chrono::{DateTime, Duration, TimeZone, Utc};

use rowcast_service::forecast::{
    self, build_forecast, interpolate, trend, ForecastInputs,
};
use rowcast_service::model::{
    AlertRecord, ConditionsRecord, HistoricalSample, StageflowSeries, WaterHistory,
    WeatherForecastEntry,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 0).unwrap()
}

fn sample(at: DateTime<Utc>, value: f64) -> HistoricalSample {
    HistoricalSample { timestamp: at, value }
}

// ---------------------------------------------------------------------------
// Projector reference cases
// ---------------------------------------------------------------------------

#[test]
fn projector_reference_case_inside_and_outside_horizon() {
    let samples = vec![sample(t0(), 10.0), sample(t0() + Duration::hours(1), 12.0)];

    // 1.5 h from the first sample (0.5 h past the last): slope extends.
    let inside = trend::project(&samples, Some(12.0), t0() + Duration::minutes(90));
    assert_eq!(inside, Some(13.0));

    // 5 h out: beyond the 3 h horizon, current value unchanged.
    let outside = trend::project(&samples, Some(12.0), t0() + Duration::hours(5));
    assert_eq!(outside, Some(12.0));
}

// ---------------------------------------------------------------------------
// Interpolator reference cases
// ---------------------------------------------------------------------------

#[test]
fn interpolator_reference_case_with_observed_flags() {
    let series = vec![sample(t0(), 100.0), sample(t0() + Duration::hours(6), 160.0)];

    let (mid, mid_observed) =
        interpolate::value_at(&series, t0() + Duration::hours(3)).unwrap();
    assert_eq!(mid, 130.0);
    assert!(mid_observed);

    let (clamped, clamped_observed) =
        interpolate::value_at(&series, t0() + Duration::hours(10)).unwrap();
    assert_eq!(clamped, 160.0);
    assert!(!clamped_observed);
}

#[test]
fn hourly_resample_of_six_hourly_stageflow_covers_the_horizon() {
    // Six-hourly river forecast over 24 h, resampled hourly.
    let series: Vec<HistoricalSample> = (0..=4)
        .map(|i| sample(t0() + Duration::hours(6 * i), 5000.0 + 250.0 * i as f64))
        .collect();
    let points = interpolate::resample(&series, t0(), Duration::hours(1), Duration::hours(24));
    assert_eq!(points.len(), 25);
    assert!(points.iter().all(|p| p.observed));
    // Linear between the 6-hourly anchors.
    assert_eq!(points[3].value, 5125.0);
    assert_eq!(points[6].value, 5250.0);
}

// ---------------------------------------------------------------------------
// End-to-end pipeline
// ---------------------------------------------------------------------------

fn rising_river_inputs() -> (Vec<WeatherForecastEntry>, WaterHistory, ConditionsRecord, StageflowSeries)
{
    let weather: Vec<WeatherForecastEntry> = (0..=48)
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
                precip_prob: Some(10.0),
                ..Default::default()
            },
        })
        .collect();

    // Gauge history: flow rising 200 cfs per 15 minutes.
    let history = WaterHistory {
        discharge: (0..8)
            .map(|i| {
                sample(
                    t0() - Duration::minutes(15 * (8 - i)),
                    7000.0 + 200.0 * i as f64,
                )
            })
            .collect(),
        gauge_height: Vec::new(),
        water_temp: Vec::new(),
    };
    let current = ConditionsRecord {
        discharge: Some(8400.0),
        water_temp: Some(58.0),
        ..Default::default()
    };

    // River forecast: crest at 12000 cfs tomorrow, 6-hourly cadence.
    let stageflow = StageflowSeries {
        stage: Vec::new(),
        flow: vec![
            sample(t0() + Duration::hours(6), 9000.0),
            sample(t0() + Duration::hours(12), 10500.0),
            sample(t0() + Duration::hours(18), 12000.0),
            sample(t0() + Duration::hours(24), 11000.0),
        ],
    };

    (weather, history, current, stageflow)
}

#[test]
fn near_term_points_project_from_gauge_history() {
    let (weather, history, current, stageflow) = rising_river_inputs();
    let inputs = ForecastInputs {
        weather: &weather,
        water_history: &history,
        current_water: &current,
        stageflow: Some(&stageflow),
        alerts: &[],
    };

    // One hour out: before the river forecast begins, so the rising
    // gauge trend drives discharge. The last sample is 8400 cfs at
    // t0-15min rising 800 cfs/h, so t0+1h projects to 9400.
    let point = forecast::forecast_point(&inputs, t0() + Duration::hours(1));
    assert!(!point.stageflow_used);
    let discharge = point.conditions.discharge.unwrap();
    assert!(
        (discharge - 9400.0).abs() < 1.0,
        "expected trend-projected ~9400 cfs, got {}",
        discharge
    );
}

#[test]
fn forecast_window_points_use_the_river_forecast() {
    let (weather, history, current, stageflow) = rising_river_inputs();
    let inputs = ForecastInputs {
        weather: &weather,
        water_history: &history,
        current_water: &current,
        stageflow: Some(&stageflow),
        alerts: &[],
    };

    // Nine hours out, inside the river-forecast span: interpolated
    // between the 6 h (9000) and 12 h (10500) anchors.
    let point = forecast::forecast_point(&inputs, t0() + Duration::hours(9));
    assert!(point.stageflow_used);
    assert_eq!(point.conditions.discharge, Some(9750.0));
    // A 9750 cfs river is above the good threshold: flow credit < 1.
    assert!(point.score.factors.flow < 1.0);
    assert!(point.score.score < 10.0);
}

#[test]
fn scores_fall_as_the_forecast_crest_approaches() {
    let (weather, history, current, stageflow) = rising_river_inputs();
    let inputs = ForecastInputs {
        weather: &weather,
        water_history: &history,
        current_water: &current,
        stageflow: Some(&stageflow),
        alerts: &[],
    };
    let points = forecast::build_standard(&inputs, t0());

    let at_6h = &points[6];
    let at_18h = &points[18];
    assert!(
        at_18h.score.score < at_6h.score.score,
        "score should fall toward the crest: {} vs {}",
        at_18h.score.score,
        at_6h.score.score
    );
}

#[test]
fn stageflow_utilization_spans_exactly_the_forecast_window() {
    let (weather, history, current, stageflow) = rising_river_inputs();
    let inputs = ForecastInputs {
        weather: &weather,
        water_history: &history,
        current_water: &current,
        stageflow: Some(&stageflow),
        alerts: &[],
    };
    let points = forecast::build_standard(&inputs, t0());

    for point in &points {
        let offset = point.timestamp - t0();
        let in_window = offset >= Duration::hours(6) && offset <= Duration::hours(24);
        assert_eq!(
            point.stageflow_used, in_window,
            "stageflow flag wrong at {} (offset {} h)",
            point.timestamp,
            offset.num_hours()
        );
    }
}

#[test]
fn alert_zeroes_every_point_of_every_horizon() {
    let (weather, history, current, stageflow) = rising_river_inputs();
    let alerts = vec![AlertRecord {
        event: "Severe Thunderstorm Warning".to_string(),
        severity: "Severe".to_string(),
        urgency: "Immediate".to_string(),
    }];
    let inputs = ForecastInputs {
        weather: &weather,
        water_history: &history,
        current_water: &current,
        stageflow: Some(&stageflow),
        alerts: &alerts,
    };

    for point in forecast::build_short_term(&inputs, t0()) {
        assert_eq!(point.score.score, 0.0);
    }
    for point in forecast::build_extended(&inputs, t0()) {
        assert_eq!(point.score.score, 0.0);
    }
}

#[test]
fn custom_cadence_produces_the_requested_grid() {
    let (weather, history, current, _) = rising_river_inputs();
    let inputs = ForecastInputs {
        weather: &weather,
        water_history: &history,
        current_water: &current,
        stageflow: None,
        alerts: &[],
    };
    let points = build_forecast(&inputs, t0(), Duration::minutes(30), Duration::hours(3));
    assert_eq!(points.len(), 7);
    assert_eq!(points[0].timestamp, t0());
    assert_eq!(points[6].timestamp, t0() + Duration::hours(3));
}

#[test]
fn pipeline_is_deterministic_for_identical_inputs() {
    let (weather, history, current, stageflow) = rising_river_inputs();
    let inputs = ForecastInputs {
        weather: &weather,
        water_history: &history,
        current_water: &current,
        stageflow: Some(&stageflow),
        alerts: &[],
    };
    let first = forecast::build_standard(&inputs, t0());
    let second = forecast::build_standard(&inputs, t0());
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.score.score.to_bits(), b.score.score.to_bits());
        assert_eq!(a.conditions, b.conditions);
    }
}
