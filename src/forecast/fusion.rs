/// Fusion of overlapping per-source condition snapshots.
///
/// Multiple sources report the same metrics for the same nominal
/// timestamp — a live gauge reading and the national river forecast,
/// for example. Fusion picks, per metric, the first non-null value in a
/// fixed precedence order. Conflicting sources are never averaged or
/// blended: a value either comes from one source or it doesn't come at
/// all. The result carries a flag recording whether any adopted value
/// came from a source marked as an external forecast.

use crate::model::{AlertRecord, ConditionsRecord, finite};

/// One source's snapshot, tagged with whether it is an external forecast
/// product (as opposed to live/primary data or a projection of it).
#[derive(Debug, Clone)]
pub struct SourceSnapshot {
    pub record: ConditionsRecord,
    pub external_forecast: bool,
}

impl SourceSnapshot {
    pub fn primary(record: ConditionsRecord) -> Self {
        Self { record, external_forecast: false }
    }

    pub fn external(record: ConditionsRecord) -> Self {
        Self { record, external_forecast: true }
    }
}

/// A fused record plus the external-contribution flag.
#[derive(Debug, Clone)]
pub struct FusedConditions {
    pub record: ConditionsRecord,
    pub external_used: bool,
}

/// Fuses snapshots ordered highest-precedence first.
pub fn fuse(snapshots: &[SourceSnapshot]) -> FusedConditions {
    let mut external_used = false;

    let mut pick = |get: fn(&ConditionsRecord) -> Option<f64>| -> Option<f64> {
        for snapshot in snapshots {
            if let Some(value) = finite(get(&snapshot.record)) {
                if snapshot.external_forecast {
                    external_used = true;
                }
                return Some(value);
            }
        }
        None
    };

    let record = ConditionsRecord {
        apparent_temp: pick(|r| r.apparent_temp),
        wind_speed: pick(|r| r.wind_speed),
        wind_gust: pick(|r| r.wind_gust),
        precipitation: pick(|r| r.precipitation),
        uv_index: pick(|r| r.uv_index),
        discharge: pick(|r| r.discharge),
        water_temp: pick(|r| r.water_temp),
        gauge_height: pick(|r| r.gauge_height),
        visibility: pick(|r| r.visibility),
        lightning_prob: pick(|r| r.lightning_prob),
        precip_prob: pick(|r| r.precip_prob),
        alerts: first_alerts(snapshots),
    };

    FusedConditions { record, external_used }
}

/// The first non-empty alert list wins; alert lists are never merged
/// across sources (they would duplicate the same CAP products).
fn first_alerts(snapshots: &[SourceSnapshot]) -> Vec<AlertRecord> {
    snapshots
        .iter()
        .find(|s| !s.record.alerts.is_empty())
        .map(|s| s.record.alerts.clone())
        .unwrap_or_default()
}
