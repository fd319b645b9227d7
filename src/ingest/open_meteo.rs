/// Open-Meteo forecast API client.
///
/// Retrieves the current weather snapshot plus hourly forecast arrays
/// for the reach. The same endpoint serves the standard (48 h) and
/// extended (7 d) horizons — only `forecast_days` differs.
///
/// API documentation: https://open-meteo.com/en/docs
///
/// Units are requested as °F / mph / inch; visibility arrives in meters
/// and is converted to miles here so every stored document speaks one
/// unit system.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::model::{finite, ConditionsRecord, RowcastError, WeatherForecastEntry};

const OPEN_METEO_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";

const METERS_PER_MILE: f64 = 1609.344;

/// Forecast depth for the standard (48 h) horizon.
pub const STANDARD_FORECAST_DAYS: u32 = 2;

/// Forecast depth for the extended horizon.
pub const EXTENDED_FORECAST_DAYS: u32 = 7;

// ============================================================================
// Open-Meteo API Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Option<CurrentBlock>,
    hourly: Option<HourlyBlock>,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    apparent_temperature: Option<f64>,
    wind_speed_10m: Option<f64>,
    wind_gusts_10m: Option<f64>,
    precipitation: Option<f64>,
    uv_index: Option<f64>,
    visibility: Option<f64>, // meters
    precipitation_probability: Option<f64>,
    lightning_potential: Option<f64>, // J/kg
}

/// Hourly arrays are parallel to `time`; individual entries may be null.
#[derive(Debug, Deserialize)]
struct HourlyBlock {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    apparent_temperature: Vec<Option<f64>>,
    #[serde(default)]
    wind_speed_10m: Vec<Option<f64>>,
    #[serde(default)]
    wind_gusts_10m: Vec<Option<f64>>,
    #[serde(default)]
    precipitation: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_probability: Vec<Option<f64>>,
    #[serde(default)]
    uv_index: Vec<Option<f64>>,
    #[serde(default)]
    visibility: Vec<Option<f64>>, // meters
    #[serde(default)]
    lightning_potential: Vec<Option<f64>>, // J/kg
}

/// Parsed result: the current snapshot plus the hourly forecast entries.
#[derive(Debug, Clone, Default)]
pub struct WeatherBundle {
    pub current: Option<ConditionsRecord>,
    pub hourly: Vec<WeatherForecastEntry>,
}

// ============================================================================
// URL construction and parsing
// ============================================================================

const CURRENT_FIELDS: &str = "apparent_temperature,wind_speed_10m,wind_gusts_10m,\
precipitation,precipitation_probability,uv_index,visibility,lightning_potential";

const HOURLY_FIELDS: &str = "apparent_temperature,wind_speed_10m,wind_gusts_10m,\
precipitation,precipitation_probability,uv_index,visibility,lightning_potential";

/// Builds a forecast request URL for the reach coordinates.
pub fn build_forecast_url(latitude: f64, longitude: f64, forecast_days: u32) -> String {
    format!(
        "{}?latitude={}&longitude={}&current={}&hourly={}\
         &windspeed_unit=mph&temperature_unit=fahrenheit&precipitation_unit=inch\
         &timezone=UTC&forecast_days={}",
        OPEN_METEO_BASE_URL, latitude, longitude, CURRENT_FIELDS, HOURLY_FIELDS, forecast_days
    )
}

/// Open-Meteo timestamps are naive ISO minutes ("2024-05-01T12:00") in
/// the requested timezone; we always request UTC.
fn parse_time(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
        .ok()
        .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc))
}

fn meters_to_miles(m: Option<f64>) -> Option<f64> {
    finite(m).map(|v| v / METERS_PER_MILE)
}

/// Bands model lightning potential (J/kg) into a lightning probability
/// percentage. The mapping is deliberately coarse — the scoring bands
/// only need to know "none / some / likely / near-certain".
pub fn lightning_potential_to_pct(potential: Option<f64>) -> Option<f64> {
    let p = finite(potential)?;
    Some(if p >= 2500.0 {
        95.0
    } else if p >= 2000.0 {
        85.0
    } else if p >= 1500.0 {
        70.0
    } else if p >= 1000.0 {
        50.0
    } else if p >= 500.0 {
        30.0
    } else if p > 0.0 {
        10.0
    } else {
        0.0
    })
}

/// Parses a forecast response body into the shared conditions shapes.
///
/// Hours with an unparseable timestamp are skipped; null entries in the
/// parallel arrays simply leave that field missing for that hour.
pub fn parse_forecast(body: &str) -> Result<WeatherBundle, RowcastError> {
    let response: ForecastResponse =
        serde_json::from_str(body).map_err(|e| RowcastError::ParseError(e.to_string()))?;

    let current = response.current.map(|c| ConditionsRecord {
        apparent_temp: finite(c.apparent_temperature),
        wind_speed: finite(c.wind_speed_10m),
        wind_gust: finite(c.wind_gusts_10m),
        precipitation: finite(c.precipitation),
        uv_index: finite(c.uv_index),
        visibility: meters_to_miles(c.visibility),
        precip_prob: finite(c.precipitation_probability),
        lightning_prob: lightning_potential_to_pct(c.lightning_potential),
        ..Default::default()
    });

    let mut hourly = Vec::new();
    if let Some(block) = response.hourly {
        let at = |v: &Vec<Option<f64>>, i: usize| -> Option<f64> { v.get(i).copied().flatten() };
        for (i, time) in block.time.iter().enumerate() {
            let Some(timestamp) = parse_time(time) else {
                continue;
            };
            hourly.push(WeatherForecastEntry {
                timestamp,
                record: ConditionsRecord {
                    apparent_temp: finite(at(&block.apparent_temperature, i)),
                    wind_speed: finite(at(&block.wind_speed_10m, i)),
                    wind_gust: finite(at(&block.wind_gusts_10m, i)),
                    precipitation: finite(at(&block.precipitation, i)),
                    precip_prob: finite(at(&block.precipitation_probability, i)),
                    uv_index: finite(at(&block.uv_index, i)),
                    visibility: meters_to_miles(at(&block.visibility, i)),
                    lightning_prob: lightning_potential_to_pct(at(&block.lightning_potential, i)),
                    ..Default::default()
                },
            });
        }
    }

    Ok(WeatherBundle { current, hourly })
}

// ============================================================================
// API Client Functions
// ============================================================================

/// Fetches current weather plus an hourly forecast of the given depth.
pub fn fetch_forecast(
    client: &reqwest::blocking::Client,
    latitude: f64,
    longitude: f64,
    forecast_days: u32,
) -> Result<WeatherBundle, Box<dyn std::error::Error>> {
    let url = build_forecast_url(latitude, longitude, forecast_days);

    let response = client.get(&url).header("Accept", "application/json").send()?;
    if !response.status().is_success() {
        return Err(Box::new(RowcastError::HttpError(response.status().as_u16())));
    }

    let body = response.text()?;
    Ok(parse_forecast(&body)?)
}

// ============================================================================
// Tests
// ============================================================================
