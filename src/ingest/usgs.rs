/// USGS NWIS Instantaneous Values API client.
///
/// Retrieves live gauge readings (water temperature, discharge, gage
/// height) for the monitored reach, plus the recent look-back window
/// that feeds trend projection.
///
/// API documentation: https://waterservices.usgs.gov/rest/IV-Service.html

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::model::{
    ConditionsRecord, HistoricalSample, RowcastError, WaterHistory, PARAM_DISCHARGE, PARAM_STAGE,
    PARAM_WATER_TEMP,
};

const NWIS_BASE_URL: &str = "https://waterservices.usgs.gov/nwis/iv/";

/// USGS sentinel for "no value".
const SENTINEL: f64 = -999999.0;

// ============================================================================
// NWIS API Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct IvResponse {
    value: IvValue,
}

#[derive(Debug, Deserialize)]
struct IvValue {
    #[serde(rename = "timeSeries", default)]
    time_series: Vec<IvTimeSeries>,
}

#[derive(Debug, Deserialize)]
struct IvTimeSeries {
    #[serde(rename = "sourceInfo")]
    source_info: IvSourceInfo,
    variable: IvVariable,
    #[serde(default)]
    values: Vec<IvValueBlock>,
}

#[derive(Debug, Deserialize)]
struct IvSourceInfo {
    #[serde(rename = "siteName")]
    site_name: String,
    #[serde(rename = "siteCode", default)]
    site_code: Vec<IvCode>,
}

#[derive(Debug, Deserialize)]
struct IvVariable {
    #[serde(rename = "variableCode", default)]
    variable_code: Vec<IvCode>,
    unit: Option<IvUnit>,
}

#[derive(Debug, Deserialize)]
struct IvCode {
    value: String,
}

#[derive(Debug, Deserialize)]
struct IvUnit {
    #[serde(rename = "unitCode")]
    unit_code: String,
}

#[derive(Debug, Deserialize)]
struct IvValueBlock {
    #[serde(default)]
    value: Vec<IvPoint>,
}

#[derive(Debug, Deserialize)]
struct IvPoint {
    value: String,
    #[serde(rename = "dateTime")]
    date_time: String,
}

// ============================================================================
// Processed observation
// ============================================================================

/// A single instantaneous measurement, enriched with site and parameter
/// metadata from the enclosing `timeSeries` object.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeObservation {
    pub site_code: String,
    pub site_name: String,
    pub parameter_code: String,
    pub unit: String,
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

// ============================================================================
// URL construction and parsing
// ============================================================================

/// Builds an IV request URL for the given sites, parameters, and ISO 8601
/// look-back period (e.g. "PT4H", "P2D").
pub fn build_iv_url(sites: &[&str], params: &[&str], period: &str) -> String {
    format!(
        "{}?sites={}&parameterCd={}&period={}&siteStatus=all&format=json",
        NWIS_BASE_URL,
        sites.join(","),
        params.join(","),
        period
    )
}

/// Parses an IV response body into flat observations.
///
/// Individual bad points (sentinel values, unparseable numbers or
/// timestamps) are skipped rather than failing the whole response; an
/// undecodable body is a `ParseError`.
pub fn parse_iv_response(body: &str) -> Result<Vec<GaugeObservation>, RowcastError> {
    let response: IvResponse =
        serde_json::from_str(body).map_err(|e| RowcastError::ParseError(e.to_string()))?;

    let mut observations = Vec::new();
    for series in response.value.time_series {
        let site_code = match series.source_info.site_code.first() {
            Some(code) => code.value.clone(),
            None => continue,
        };
        let parameter_code = match series.variable.variable_code.first() {
            Some(code) => code.value.clone(),
            None => continue,
        };
        let unit = series
            .variable
            .unit
            .map(|u| u.unit_code)
            .unwrap_or_default();

        for block in series.values {
            for point in block.value {
                let Ok(value) = point.value.trim().parse::<f64>() else {
                    continue;
                };
                if value == SENTINEL || !value.is_finite() {
                    continue;
                }
                let Ok(timestamp) = DateTime::parse_from_rfc3339(&point.date_time) else {
                    continue;
                };
                observations.push(GaugeObservation {
                    site_code: site_code.clone(),
                    site_name: series.source_info.site_name.clone(),
                    parameter_code: parameter_code.clone(),
                    unit: unit.clone(),
                    timestamp: timestamp.with_timezone(&Utc),
                    value,
                });
            }
        }
    }
    Ok(observations)
}

// ============================================================================
// API Client Functions
// ============================================================================

/// Fetches the look-back window of instantaneous readings for one site.
pub fn fetch_instantaneous(
    client: &reqwest::blocking::Client,
    site_code: &str,
    period: &str,
) -> Result<Vec<GaugeObservation>, Box<dyn std::error::Error>> {
    let url = build_iv_url(
        &[site_code],
        &[PARAM_WATER_TEMP, PARAM_DISCHARGE, PARAM_STAGE],
        period,
    );

    let response = client.get(&url).header("Accept", "application/json").send()?;
    if !response.status().is_success() {
        return Err(Box::new(RowcastError::HttpError(response.status().as_u16())));
    }

    let body = response.text()?;
    let observations = parse_iv_response(&body)?;
    if observations.is_empty() {
        return Err(Box::new(RowcastError::NoDataAvailable(format!(
            "site {}: no usable readings in response",
            site_code
        ))));
    }
    Ok(observations)
}

// ============================================================================
// Snapshot and history assembly
// ============================================================================

fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 1.8 + 32.0
}

fn latest_for(observations: &[GaugeObservation], parameter: &str) -> Option<GaugeObservation> {
    observations
        .iter()
        .filter(|o| o.parameter_code == parameter)
        .max_by_key(|o| o.timestamp)
        .cloned()
}

/// The most recent value of each water parameter, as a conditions record.
/// Water temperature arrives in Celsius and is converted to Fahrenheit.
pub fn water_snapshot(observations: &[GaugeObservation]) -> ConditionsRecord {
    ConditionsRecord {
        discharge: latest_for(observations, PARAM_DISCHARGE).map(|o| o.value),
        gauge_height: latest_for(observations, PARAM_STAGE).map(|o| o.value),
        water_temp: latest_for(observations, PARAM_WATER_TEMP)
            .map(|o| celsius_to_fahrenheit(o.value)),
        ..Default::default()
    }
}

fn series_for(observations: &[GaugeObservation], parameter: &str) -> Vec<HistoricalSample> {
    let mut series: Vec<HistoricalSample> = observations
        .iter()
        .filter(|o| o.parameter_code == parameter)
        .map(|o| HistoricalSample {
            timestamp: o.timestamp,
            value: o.value,
        })
        .collect();
    series.sort_by_key(|s| s.timestamp);
    series
}

/// Per-metric history series from the look-back window, ordered by time.
/// These feed the trend projector.
pub fn water_history(observations: &[GaugeObservation]) -> WaterHistory {
    let mut water_temp = series_for(observations, PARAM_WATER_TEMP);
    for sample in &mut water_temp {
        sample.value = celsius_to_fahrenheit(sample.value);
    }
    WaterHistory {
        discharge: series_for(observations, PARAM_DISCHARGE),
        gauge_height: series_for(observations, PARAM_STAGE),
        water_temp,
    }
}

// ============================================================================
// Tests
// ============================================================================
