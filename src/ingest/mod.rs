/// Upstream data acquisition clients.
///
/// One submodule per provider. Each keeps a strict split between fetch
/// functions (blocking HTTP, bounded timeout, owned by the caller's
/// client) and pure `parse_*` functions over response bodies, so every
/// parser is unit-testable offline. Acquisition failures surface as
/// errors here and are logged by the refresh layer — they never reach
/// the scoring core.
///
/// Submodules:
/// - `usgs` — NWIS instantaneous values: live gauge snapshot + history.
/// - `open_meteo` — current weather, hourly forecast, extended forecast.
/// - `nwps` — national river forecast (observed + forecast stage/flow).
/// - `nws_alerts` — active CAP alerts for the reach.

pub mod nws_alerts;
pub mod nwps;
pub mod open_meteo;
pub mod usgs;
