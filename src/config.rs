/// Service configuration.
///
/// Loaded from a TOML file named by the `ROWCAST_CONFIG` environment
/// variable (environment itself is bootstrapped from `.env` in `main`).
/// Every field has a production default so the daemon runs with no
/// config file at all; the file only overrides what it names.

use serde::Deserialize;

/// Default per-request timeout for upstream calls, seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Refresh cadences per source.
    pub refresh: RefreshIntervals,
    /// Upstream HTTP timeout, seconds.
    pub http_timeout_secs: u64,
    /// Logging setup.
    pub log: LogConfig,
}

/// Fixed refresh intervals, minutes. Sources refresh independently; the
/// scheduler guarantees at most one in-flight refresh per source.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RefreshIntervals {
    pub weather_minutes: i64,
    pub water_minutes: i64,
    pub stageflow_minutes: i64,
    pub alerts_minutes: i64,
    /// Score recompute cadence; reads only the store, never upstreams.
    pub scores_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Minimum level: "debug", "info", "warn", or "error".
    pub level: String,
    /// Optional log file path; console-only when absent.
    pub file: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            refresh: RefreshIntervals::default(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            log: LogConfig::default(),
        }
    }
}

impl Default for RefreshIntervals {
    fn default() -> Self {
        Self {
            weather_minutes: 10,
            water_minutes: 15,
            stageflow_minutes: 30,
            alerts_minutes: 10,
            scores_minutes: 10,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl ServiceConfig {
    /// Parses a TOML document, filling unnamed fields with defaults.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Loads from the path in `ROWCAST_CONFIG`, if set and readable;
    /// falls back to defaults otherwise. A present-but-invalid file is
    /// an error — a typo'd cadence should not silently become a default.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        match std::env::var("ROWCAST_CONFIG") {
            Ok(path) => {
                let text = std::fs::read_to_string(&path)?;
                Ok(Self::from_toml(&text)?)
            }
            Err(_) => Ok(Self::default()),
        }
    }
}
