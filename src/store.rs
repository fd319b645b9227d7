/// Namespaced key → JSON document snapshot store.
///
/// Every refresh cycle writes one complete, internally consistent
/// document per key: the value is serialized in full and swapped in
/// under the lock, so a concurrent reader sees either the previous
/// snapshot or the new one, never a torn mix of fields. There is no
/// cross-key consistency — independently refreshed datasets (weather vs.
/// water) may be momentarily out of phase.
///
/// This is the in-process face of the persistent cache; durable backing
/// is deployment wiring and lives outside this crate.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Store keys, one per independently refreshed document.
pub mod keys {
    /// Current weather snapshot (`ConditionsRecord`).
    pub const WEATHER_CURRENT: &str = "weather_current";
    /// Hourly weather forecast (`Vec<WeatherForecastEntry>`), 48 h depth.
    pub const WEATHER_FORECAST: &str = "weather_forecast";
    /// Extended hourly weather forecast, 7 d depth.
    pub const WEATHER_EXTENDED: &str = "weather_extended";
    /// Current water snapshot from the live gauge (`ConditionsRecord`).
    pub const WATER_CURRENT: &str = "water_current";
    /// Recent gauge history (`WaterHistory`).
    pub const WATER_HISTORY: &str = "water_history";
    /// River forecast series (`StageflowSeries`, forecast portion).
    pub const STAGEFLOW_FORECAST: &str = "stageflow_forecast";
    /// Latest observed stage/flow (`ConditionsRecord`).
    pub const STAGEFLOW_OBSERVED: &str = "stageflow_observed";
    /// Active alerts (`Vec<AlertRecord>`).
    pub const ALERTS: &str = "alerts";

    /// Current fused conditions + score (`CurrentScoreDocument`).
    pub const SCORE_CURRENT: &str = "score_current";
    /// Detailed score arrays per cadence (`Vec<ForecastPoint>`).
    pub const FORECAST_SCORES_SHORT: &str = "forecast_scores_short";
    pub const FORECAST_SCORES: &str = "forecast_scores";
    pub const FORECAST_SCORES_EXTENDED: &str = "forecast_scores_extended";
    /// Timestamp-and-score variants (`Vec<ForecastPointSummary>`).
    pub const FORECAST_SCORES_SHORT_SIMPLE: &str = "forecast_scores_short_simple";
    pub const FORECAST_SCORES_SIMPLE: &str = "forecast_scores_simple";
    pub const FORECAST_SCORES_EXTENDED_SIMPLE: &str = "forecast_scores_extended_simple";
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Thread-safe snapshot store. Cheap to share behind an `Arc`; writers
/// and readers contend only for the duration of a map access, never for
/// serialization.
#[derive(Default)]
pub struct SnapshotStore {
    documents: Mutex<HashMap<String, String>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes `document` and atomically replaces the key's snapshot.
    pub fn put<T: Serialize>(&self, key: &str, document: &T) -> Result<(), serde_json::Error> {
        let json = serde_json::to_string(document)?;
        self.documents
            .lock()
            .expect("snapshot store poisoned")
            .insert(key.to_string(), json);
        Ok(())
    }

    /// Deserializes a typed copy of the key's current snapshot.
    ///
    /// Returns `None` when the key has never been written or the stored
    /// document does not decode as `T` (a schema-drift guard: a bad
    /// document reads as absent, not as a panic).
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let json = self
            .documents
            .lock()
            .expect("snapshot store poisoned")
            .get(key)
            .cloned()?;
        serde_json::from_str(&json).ok()
    }

    /// The raw stored document, for serving layers that pass JSON through.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.documents
            .lock()
            .expect("snapshot store poisoned")
            .get(key)
            .cloned()
    }

    /// True once the key has been written at least once.
    pub fn contains(&self, key: &str) -> bool {
        self.documents
            .lock()
            .expect("snapshot store poisoned")
            .contains_key(key)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
