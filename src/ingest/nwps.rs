/// NOAA NWPS stageflow client.
///
/// Retrieves observed and forecast river stage/flow for the reach's
/// forecast gauge. The forecast arrives at a coarse multi-hour cadence
/// (typically 6-hourly) and is resampled by the forecast pipeline before
/// scoring.
///
/// API documentation: https://api.water.noaa.gov/nwps/v1/docs/

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::model::{ConditionsRecord, HistoricalSample, RowcastError, StageflowSeries};

const NWPS_BASE_URL: &str = "https://api.water.noaa.gov/nwps/v1";

/// NWPS sentinel for a missing reading.
const SENTINEL: f64 = -999.0;

// ============================================================================
// NWPS API Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct StageflowResponse {
    observed: Option<StageflowBlock>,
    forecast: Option<StageflowBlock>,
}

#[derive(Debug, Deserialize)]
struct StageflowBlock {
    #[serde(default)]
    data: Vec<StageflowEntry>,
}

/// One stage/flow reading. `primary` is stage in feet, `secondary` is
/// flow in thousands of cubic feet per second.
#[derive(Debug, Deserialize)]
struct StageflowEntry {
    #[serde(rename = "validTime")]
    valid_time: String,
    primary: Option<f64>,
    secondary: Option<f64>,
}

/// Parsed stageflow data: observed history, the forecast series, and the
/// latest observed reading as a conditions record (gauge-outage backstop
/// for current-score fusion).
#[derive(Debug, Clone, Default)]
pub struct StageflowBundle {
    pub observed: StageflowSeries,
    pub forecast: StageflowSeries,
    pub latest_observed: Option<ConditionsRecord>,
}

// ============================================================================
// URL construction and parsing
// ============================================================================

/// Builds the stageflow request URL for an NWPS gauge (e.g. "padp1").
pub fn build_stageflow_url(gauge_id: &str) -> String {
    format!("{}/gauges/{}/stageflow", NWPS_BASE_URL, gauge_id)
}

fn usable(value: Option<f64>) -> Option<f64> {
    crate::model::finite(value).filter(|v| *v != SENTINEL)
}

fn block_to_series(block: Option<StageflowBlock>) -> StageflowSeries {
    let mut series = StageflowSeries::default();
    let Some(block) = block else {
        return series;
    };
    for entry in block.data {
        let Ok(timestamp) = DateTime::parse_from_rfc3339(&entry.valid_time) else {
            continue;
        };
        let timestamp = timestamp.with_timezone(&Utc);
        if let Some(stage) = usable(entry.primary) {
            series.stage.push(HistoricalSample { timestamp, value: stage });
        }
        if let Some(flow_kcfs) = usable(entry.secondary) {
            series.flow.push(HistoricalSample {
                timestamp,
                value: flow_kcfs * 1000.0, // kcfs -> cfs
            });
        }
    }
    series.stage.sort_by_key(|s| s.timestamp);
    series.flow.sort_by_key(|s| s.timestamp);
    series
}

fn latest_record(observed: &StageflowSeries) -> Option<ConditionsRecord> {
    let stage = observed.stage.last();
    let flow = observed.flow.last();
    if stage.is_none() && flow.is_none() {
        return None;
    }
    Some(ConditionsRecord {
        gauge_height: stage.map(|s| s.value),
        discharge: flow.map(|s| s.value),
        ..Default::default()
    })
}

/// Parses a stageflow response body.
pub fn parse_stageflow(body: &str) -> Result<StageflowBundle, RowcastError> {
    let response: StageflowResponse =
        serde_json::from_str(body).map_err(|e| RowcastError::ParseError(e.to_string()))?;

    let observed = block_to_series(response.observed);
    let forecast = block_to_series(response.forecast);
    let latest_observed = latest_record(&observed);

    Ok(StageflowBundle { observed, forecast, latest_observed })
}

// ============================================================================
// API Client Functions
// ============================================================================

/// Fetches observed + forecast stageflow for a gauge.
pub fn fetch_stageflow(
    client: &reqwest::blocking::Client,
    gauge_id: &str,
) -> Result<StageflowBundle, Box<dyn std::error::Error>> {
    let url = build_stageflow_url(gauge_id);

    let response = client.get(&url).header("Accept", "application/json").send()?;
    if !response.status().is_success() {
        return Err(Box::new(RowcastError::HttpError(response.status().as_u16())));
    }

    let body = response.text()?;
    let bundle = parse_stageflow(&body)?;
    if bundle.forecast.flow.is_empty() && bundle.forecast.stage.is_empty() {
        return Err(Box::new(RowcastError::NoDataAvailable(format!(
            "gauge {}: stageflow response carried no forecast points",
            gauge_id
        ))));
    }
    Ok(bundle)
}

// ============================================================================
// Tests
// ============================================================================
