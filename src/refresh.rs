/// Fixed-interval refresh cycles, one per upstream source.
///
/// Each source refreshes on its own cadence and owns a single-flight
/// guard: if a refresh is still in flight when the next trigger fires,
/// the trigger is skipped rather than racing a second acquisition. A
/// failed refresh logs and leaves the last good snapshot in the store —
/// stale-but-available data always beats a blocked reader.
///
/// The score job is special: it reads only the store, so a stalled
/// upstream call can never delay scoring of the last good dataset.

use std::sync::{Mutex, TryLockError};
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};

use crate::config::ServiceConfig;
use crate::forecast;
use crate::ingest::{nwps, nws_alerts, open_meteo, usgs};
use crate::logging::{self, DataSource};
use crate::model::{
    AlertRecord, ConditionsRecord, ForecastPoint, StageflowSeries, WaterHistory,
    WeatherForecastEntry,
};
use crate::score;
use crate::sites;
use crate::store::{keys, SnapshotStore};

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Weather,
    Water,
    Stageflow,
    Alerts,
    Scores,
}

impl JobKind {
    pub fn name(self) -> &'static str {
        match self {
            JobKind::Weather => "weather refresh",
            JobKind::Water => "water refresh",
            JobKind::Stageflow => "stageflow refresh",
            JobKind::Alerts => "alerts refresh",
            JobKind::Scores => "score recompute",
        }
    }

    fn source(self) -> DataSource {
        match self {
            JobKind::Weather => DataSource::OpenMeteo,
            JobKind::Water => DataSource::Usgs,
            JobKind::Stageflow => DataSource::Nwps,
            JobKind::Alerts => DataSource::NwsAlerts,
            JobKind::Scores => DataSource::Store,
        }
    }
}

/// One job's cadence bookkeeping for the daemon loop.
#[derive(Debug)]
pub struct JobSchedule {
    pub kind: JobKind,
    pub interval: Duration,
    pub last_run: Option<DateTime<Utc>>,
}

impl JobSchedule {
    pub fn due(&self, now: DateTime<Utc>) -> bool {
        match self.last_run {
            None => true,
            Some(last) => now - last >= self.interval,
        }
    }
}

/// The full production schedule for a config's cadences.
pub fn job_schedules(config: &ServiceConfig) -> Vec<JobSchedule> {
    let r = &config.refresh;
    [
        (JobKind::Weather, r.weather_minutes),
        (JobKind::Water, r.water_minutes),
        (JobKind::Stageflow, r.stageflow_minutes),
        (JobKind::Alerts, r.alerts_minutes),
        (JobKind::Scores, r.scores_minutes),
    ]
    .into_iter()
    .map(|(kind, minutes)| JobSchedule {
        kind,
        interval: Duration::minutes(minutes),
        last_run: None,
    })
    .collect()
}

// ---------------------------------------------------------------------------
// Single-flight guards
// ---------------------------------------------------------------------------

/// One mutual-exclusion guard per source. `try_lock` semantics: a trigger
/// that finds its source busy is dropped, not queued.
#[derive(Default)]
pub struct SourceGuards {
    weather: Mutex<()>,
    water: Mutex<()>,
    stageflow: Mutex<()>,
    alerts: Mutex<()>,
    scores: Mutex<()>,
}

impl SourceGuards {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn guard_for(&self, kind: JobKind) -> &Mutex<()> {
        match kind {
            JobKind::Weather => &self.weather,
            JobKind::Water => &self.water,
            JobKind::Stageflow => &self.stageflow,
            JobKind::Alerts => &self.alerts,
            JobKind::Scores => &self.scores,
        }
    }
}

/// What happened to one guarded job invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Completed,
    /// A previous invocation of the same job was still running.
    SkippedInFlight,
    Failed,
}

/// Runs a job under its source guard.
pub fn run_guarded(
    guards: &SourceGuards,
    kind: JobKind,
    store: &SnapshotStore,
    config: &ServiceConfig,
    now: DateTime<Utc>,
) -> JobOutcome {
    let reach = sites::primary_reach();
    let _held = match guards.guard_for(kind).try_lock() {
        Ok(held) => held,
        Err(TryLockError::WouldBlock) => {
            logging::debug(
                kind.source(),
                Some(reach.id),
                &format!("{} still in flight, skipping trigger", kind.name()),
            );
            return JobOutcome::SkippedInFlight;
        }
        Err(TryLockError::Poisoned(_)) => {
            logging::error(
                kind.source(),
                Some(reach.id),
                &format!("{} guard poisoned, skipping trigger", kind.name()),
            );
            return JobOutcome::Failed;
        }
    };

    match run_job(kind, store, config, now) {
        Ok(()) => {
            logging::debug(kind.source(), Some(reach.id), &format!("{} complete", kind.name()));
            JobOutcome::Completed
        }
        Err(err) => {
            logging::log_source_failure(kind.source(), reach.id, kind.name(), err.as_ref());
            JobOutcome::Failed
        }
    }
}

// ---------------------------------------------------------------------------
// Job bodies
// ---------------------------------------------------------------------------

fn http_client(config: &ServiceConfig) -> Result<reqwest::blocking::Client, reqwest::Error> {
    reqwest::blocking::Client::builder()
        .timeout(StdDuration::from_secs(config.http_timeout_secs))
        .build()
}

fn run_job(
    kind: JobKind,
    store: &SnapshotStore,
    config: &ServiceConfig,
    now: DateTime<Utc>,
) -> Result<(), Box<dyn std::error::Error>> {
    match kind {
        JobKind::Weather => refresh_weather(&http_client(config)?, store),
        JobKind::Water => refresh_water(&http_client(config)?, store),
        JobKind::Stageflow => refresh_stageflow(&http_client(config)?, store),
        JobKind::Alerts => refresh_alerts(&http_client(config)?, store),
        JobKind::Scores => recompute_scores(store, now),
    }
}

/// Fetches the 48 h and 7 d weather forecasts and replaces the weather
/// snapshots. One source, one guard, one cycle.
fn refresh_weather(
    client: &reqwest::blocking::Client,
    store: &SnapshotStore,
) -> Result<(), Box<dyn std::error::Error>> {
    let reach = sites::primary_reach();

    let standard = open_meteo::fetch_forecast(
        client,
        reach.latitude,
        reach.longitude,
        open_meteo::STANDARD_FORECAST_DAYS,
    )?;
    if let Some(current) = &standard.current {
        store.put(keys::WEATHER_CURRENT, current)?;
    }
    store.put(keys::WEATHER_FORECAST, &standard.hourly)?;

    let extended = open_meteo::fetch_forecast(
        client,
        reach.latitude,
        reach.longitude,
        open_meteo::EXTENDED_FORECAST_DAYS,
    )?;
    store.put(keys::WEATHER_EXTENDED, &extended.hourly)?;

    logging::info(
        DataSource::OpenMeteo,
        Some(reach.id),
        &format!(
            "weather updated: {} standard hours, {} extended hours",
            standard.hourly.len(),
            extended.hourly.len()
        ),
    );
    Ok(())
}

/// Fetches the gauge look-back window and replaces the water snapshots.
fn refresh_water(
    client: &reqwest::blocking::Client,
    store: &SnapshotStore,
) -> Result<(), Box<dyn std::error::Error>> {
    let reach = sites::primary_reach();

    // Two days of 15-minute readings; the trend projector truncates to
    // the recent tail it needs.
    let observations = usgs::fetch_instantaneous(client, reach.usgs_site_code, "P2D")?;
    store.put(keys::WATER_CURRENT, &usgs::water_snapshot(&observations))?;
    store.put(keys::WATER_HISTORY, &usgs::water_history(&observations))?;

    logging::info(
        DataSource::Usgs,
        Some(reach.id),
        &format!("water updated: {} observations", observations.len()),
    );
    Ok(())
}

/// Fetches the river forecast and replaces the stageflow snapshots.
fn refresh_stageflow(
    client: &reqwest::blocking::Client,
    store: &SnapshotStore,
) -> Result<(), Box<dyn std::error::Error>> {
    let reach = sites::primary_reach();

    let bundle = nwps::fetch_stageflow(client, reach.nwps_gauge_id)?;
    store.put(keys::STAGEFLOW_FORECAST, &bundle.forecast)?;
    if let Some(observed) = &bundle.latest_observed {
        store.put(keys::STAGEFLOW_OBSERVED, observed)?;
    }

    logging::info(
        DataSource::Nwps,
        Some(reach.id),
        &format!(
            "stageflow updated: {} forecast flow points",
            bundle.forecast.flow.len()
        ),
    );
    Ok(())
}

/// Fetches active alerts for the reach point.
fn refresh_alerts(
    client: &reqwest::blocking::Client,
    store: &SnapshotStore,
) -> Result<(), Box<dyn std::error::Error>> {
    let reach = sites::primary_reach();

    let alerts = nws_alerts::fetch_active_alerts(client, reach.latitude, reach.longitude)?;
    store.put(keys::ALERTS, &alerts)?;

    if !alerts.is_empty() {
        logging::warn(
            DataSource::NwsAlerts,
            Some(reach.id),
            &format!("{} active alerts for the reach", alerts.len()),
        );
    }
    Ok(())
}

/// Recomputes the current score and all three forecast horizons from the
/// stored snapshots. Reads the store only — never an upstream — so it
/// serves whatever data is freshest without ever blocking on I/O.
fn recompute_scores(
    store: &SnapshotStore,
    now: DateTime<Utc>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut weather_current: ConditionsRecord =
        store.get(keys::WEATHER_CURRENT).unwrap_or_default();
    let weather_forecast: Vec<WeatherForecastEntry> =
        store.get(keys::WEATHER_FORECAST).unwrap_or_default();
    let weather_extended: Vec<WeatherForecastEntry> =
        store.get(keys::WEATHER_EXTENDED).unwrap_or_default();
    let water_current: ConditionsRecord = store.get(keys::WATER_CURRENT).unwrap_or_default();
    let water_history: WaterHistory = store.get(keys::WATER_HISTORY).unwrap_or_default();
    let stageflow: Option<StageflowSeries> = store.get(keys::STAGEFLOW_FORECAST);
    let stageflow_observed: Option<ConditionsRecord> = store.get(keys::STAGEFLOW_OBSERVED);
    let alerts: Vec<AlertRecord> = store.get(keys::ALERTS).unwrap_or_default();

    // Current score from the fused live snapshots.
    weather_current.alerts = alerts.clone();
    let fused = forecast::current_conditions(
        &weather_current,
        &water_current,
        stageflow_observed.as_ref(),
    );
    let current = ForecastPoint {
        timestamp: now,
        score: score::compute_score(&fused.record),
        conditions: fused.record,
        stageflow_used: fused.external_used,
    };
    store.put(keys::SCORE_CURRENT, &current)?;

    // Short-term and standard horizons from the 48 h weather forecast.
    let inputs = forecast::ForecastInputs {
        weather: &weather_forecast,
        water_history: &water_history,
        current_water: &water_current,
        stageflow: stageflow.as_ref(),
        alerts: &alerts,
    };
    let short = forecast::build_short_term(&inputs, now);
    store.put(keys::FORECAST_SCORES_SHORT, &short)?;
    store.put(keys::FORECAST_SCORES_SHORT_SIMPLE, &forecast::summarize(&short))?;

    let standard = forecast::build_standard(&inputs, now);
    store.put(keys::FORECAST_SCORES, &standard)?;
    store.put(keys::FORECAST_SCORES_SIMPLE, &forecast::summarize(&standard))?;

    // Extended horizon from the 7 d weather forecast.
    let extended_inputs = forecast::ForecastInputs {
        weather: &weather_extended,
        ..inputs
    };
    let extended = forecast::build_extended(&extended_inputs, now);
    store.put(keys::FORECAST_SCORES_EXTENDED, &extended)?;
    store.put(
        keys::FORECAST_SCORES_EXTENDED_SIMPLE,
        &forecast::summarize(&extended),
    )?;

    logging::info(
        DataSource::Store,
        Some(sites::primary_reach().id),
        &format!(
            "scores updated: current {}, {} short / {} standard / {} extended points",
            current.score.score,
            short.len(),
            standard.len(),
            extended.len()
        ),
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
