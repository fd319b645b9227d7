/// Core data types for the rowing conditions service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no logic beyond trait impls, no I/O, and no HTTP dependencies —
/// only types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Parameter codes
// ---------------------------------------------------------------------------

/// USGS parameter code for water temperature, in degrees Celsius.
pub const PARAM_WATER_TEMP: &str = "00010";

/// USGS parameter code for discharge (streamflow), in cubic feet per second.
pub const PARAM_DISCHARGE: &str = "00060";

/// USGS parameter code for gage height (stage), in feet.
pub const PARAM_STAGE: &str = "00065";

// ---------------------------------------------------------------------------
// Conditions snapshot
// ---------------------------------------------------------------------------

/// One set of river and weather readings for a single point in time.
///
/// Every numeric field is optional: upstream sources routinely omit
/// parameters, and the scoring engine supplies a documented neutral or
/// conservative default for each missing field. Arithmetic is never
/// performed on a `None` directly.
///
/// Serialized field names match the stored-document format
/// (`apparentTemp`, `windSpeed`, ...).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionsRecord {
    /// Apparent ("feels like") air temperature, °F.
    pub apparent_temp: Option<f64>,
    /// Sustained wind speed, mph.
    pub wind_speed: Option<f64>,
    /// Wind gust speed, mph.
    pub wind_gust: Option<f64>,
    /// Precipitation rate, inches per hour.
    pub precipitation: Option<f64>,
    /// UV index (unitless, 0–11+).
    pub uv_index: Option<f64>,
    /// River discharge, cubic feet per second.
    pub discharge: Option<f64>,
    /// Water temperature, °F.
    pub water_temp: Option<f64>,
    /// Gage height (stage), feet.
    pub gauge_height: Option<f64>,
    /// Horizontal visibility, miles.
    pub visibility: Option<f64>,
    /// Probability of lightning within the hour, percent.
    pub lightning_prob: Option<f64>,
    /// Probability of precipitation, percent.
    pub precip_prob: Option<f64>,
    /// Active weather alerts covering the reach.
    #[serde(default)]
    pub alerts: Vec<AlertRecord>,
}

/// One active weather alert, reduced to the CAP fields the safety
/// scoring consumes.
///
/// `severity` and `urgency` carry the CAP vocabulary as-is
/// ("Severe", "Extreme", "Immediate", ...); matching is case-insensitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRecord {
    /// CAP event name, e.g. "Flash Flood Warning".
    pub event: String,
    pub severity: String,
    pub urgency: String,
}

// ---------------------------------------------------------------------------
// Time series types
// ---------------------------------------------------------------------------

/// A single timestamped value from one metric's history or forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSample {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Recent history for the three projectable water metrics, one ordered
/// series each. Produced by the USGS ingest from the look-back window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterHistory {
    pub discharge: Vec<HistoricalSample>,
    pub gauge_height: Vec<HistoricalSample>,
    pub water_temp: Vec<HistoricalSample>,
}

/// River-forecast stage and flow series from the national forecasting
/// source, at its native coarse (multi-hour) cadence. Resampled by the
/// forecast pipeline before use.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageflowSeries {
    pub stage: Vec<HistoricalSample>,
    pub flow: Vec<HistoricalSample>,
}

/// One hour of the meteorological source's forecast, already converted
/// into the shared conditions shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherForecastEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub record: ConditionsRecord,
}

// ---------------------------------------------------------------------------
// Score types
// ---------------------------------------------------------------------------

/// Per-factor sub-scores, each in [0, 1]. The overall score is their
/// product times ten.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorScores {
    pub temperature: f64,
    pub wind: f64,
    pub flow: f64,
    pub water_temp: f64,
    pub precipitation: f64,
    pub uv: f64,
    pub safety: f64,
}

/// Result of one scoring pass: the 0–10 score (two decimals) and the
/// sub-scores that produced it. The score is always defined and finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub score: f64,
    pub factors: FactorScores,
}

/// One scored point of a forecast horizon.
///
/// `stageflow_used` records whether any value in `conditions` came from
/// the external river-forecast source rather than the primary live-data
/// projection path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    pub timestamp: DateTime<Utc>,
    pub conditions: ConditionsRecord,
    pub score: ScoreResult,
    pub stageflow_used: bool,
}

/// Timestamp-and-score-only view of a `ForecastPoint`, stored alongside
/// the detailed arrays for lightweight consumers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPointSummary {
    pub timestamp: DateTime<Utc>,
    pub score: f64,
    pub stageflow_used: bool,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching or parsing upstream data.
///
/// These never reach the scoring core — acquisition failures are logged
/// and the last stored snapshot stays authoritative.
#[derive(Debug, PartialEq)]
pub enum RowcastError {
    /// Non-2xx HTTP response from an upstream API.
    HttpError(u16),
    /// The response body could not be deserialized.
    ParseError(String),
    /// The response parsed but contained no usable series for the site.
    NoDataAvailable(String),
    /// A reading exists but is older than the configured freshness threshold.
    StaleData { source: String, age_minutes: u64 },
}

impl std::fmt::Display for RowcastError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowcastError::HttpError(code) => write!(f, "HTTP error: {}", code),
            RowcastError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            RowcastError::NoDataAvailable(what) => {
                write!(f, "No data available: {}", what)
            }
            RowcastError::StaleData { source, age_minutes } => {
                write!(f, "Stale data from {}: {} minutes old", source, age_minutes)
            }
        }
    }
}

impl std::error::Error for RowcastError {}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Filters an optional reading down to a usable number. NaN and infinite
/// values are treated exactly like missing ones.
pub fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}
