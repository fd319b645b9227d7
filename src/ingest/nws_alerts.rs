/// NWS active-alert client.
///
/// Retrieves active CAP alerts for the reach's coordinates and reduces
/// them to the three fields the safety scoring consumes. The NWS API
/// requires an identifying User-Agent on every request.
///
/// API documentation: https://www.weather.gov/documentation/services-web-api

use serde::Deserialize;

use crate::model::{AlertRecord, RowcastError};

const NWS_BASE_URL: &str = "https://api.weather.gov";

/// Identifying User-Agent required by the NWS API.
pub const USER_AGENT: &str = "rowcast_service (river conditions monitor)";

// ============================================================================
// NWS API Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct AlertsResponse {
    #[serde(default)]
    features: Vec<AlertFeature>,
}

#[derive(Debug, Deserialize)]
struct AlertFeature {
    properties: AlertProperties,
}

#[derive(Debug, Deserialize)]
struct AlertProperties {
    event: Option<String>,
    severity: Option<String>,
    urgency: Option<String>,
}

// ============================================================================
// URL construction and parsing
// ============================================================================

/// Builds the active-alerts request URL for a point.
pub fn build_alerts_url(latitude: f64, longitude: f64) -> String {
    format!(
        "{}/alerts/active?point={},{}",
        NWS_BASE_URL, latitude, longitude
    )
}

/// Parses an active-alerts response body. Features without an event name
/// are dropped; missing severity/urgency default to "Unknown", which the
/// safety taxonomy treats as the mildest match.
pub fn parse_alerts(body: &str) -> Result<Vec<AlertRecord>, RowcastError> {
    let response: AlertsResponse =
        serde_json::from_str(body).map_err(|e| RowcastError::ParseError(e.to_string()))?;

    Ok(response
        .features
        .into_iter()
        .filter_map(|feature| {
            let props = feature.properties;
            let event = props.event?;
            Some(AlertRecord {
                event,
                severity: props.severity.unwrap_or_else(|| "Unknown".to_string()),
                urgency: props.urgency.unwrap_or_else(|| "Unknown".to_string()),
            })
        })
        .collect())
}

// ============================================================================
// API Client Functions
// ============================================================================

/// Fetches the active alerts covering a point.
pub fn fetch_active_alerts(
    client: &reqwest::blocking::Client,
    latitude: f64,
    longitude: f64,
) -> Result<Vec<AlertRecord>, Box<dyn std::error::Error>> {
    let url = build_alerts_url(latitude, longitude);

    let response = client
        .get(&url)
        .header("Accept", "application/geo+json")
        .header("User-Agent", USER_AGENT)
        .send()?;
    if !response.status().is_success() {
        return Err(Box::new(RowcastError::HttpError(response.status().as_u16())));
    }

    let body = response.text()?;
    Ok(parse_alerts(&body)?)
}

// ============================================================================
// Tests
// ============================================================================
