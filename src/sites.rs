/// Site registry for the rowing conditions service.
///
/// Defines the monitored river reach and the upstream identifiers every
/// ingest client uses for it. This is the single source of truth for
/// site codes and coordinates — other modules reference the registry
/// rather than hardcoding identifiers.

use crate::model::{PARAM_DISCHARGE, PARAM_STAGE, PARAM_WATER_TEMP};

// ---------------------------------------------------------------------------
// Reach metadata
// ---------------------------------------------------------------------------

/// Identifiers and metadata for one monitored rowing reach.
pub struct Reach {
    /// Short stable identifier used in log lines and store namespacing.
    pub id: &'static str,
    /// Human-readable reach name.
    pub name: &'static str,
    /// 8-digit USGS site code for the live gauge.
    pub usgs_site_code: &'static str,
    /// NWPS gauge identifier for the river forecast.
    pub nwps_gauge_id: &'static str,
    /// WGS84 latitude of the reach (weather + alert point).
    pub latitude: f64,
    /// WGS84 longitude of the reach.
    pub longitude: f64,
    /// USGS parameters the live gauge is expected to provide.
    pub expected_parameters: &'static [&'static str],
}

/// All monitored reaches. Currently a single reach; the registry shape
/// matches the multi-site ingest so adding a reach is a data change.
pub static REACH_REGISTRY: &[Reach] = &[Reach {
    id: "boathouse-row",
    name: "Schuylkill River at Philadelphia, PA",
    usgs_site_code: "01474500",
    nwps_gauge_id: "padp1",
    latitude: 39.8682,
    longitude: -75.5916,
    expected_parameters: &[PARAM_WATER_TEMP, PARAM_DISCHARGE, PARAM_STAGE],
}];

/// The reach scores are computed for. The registry is never empty.
pub fn primary_reach() -> &'static Reach {
    &REACH_REGISTRY[0]
}

/// Looks up a reach by its short identifier.
pub fn find_reach(id: &str) -> Option<&'static Reach> {
    REACH_REGISTRY.iter().find(|r| r.id == id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
