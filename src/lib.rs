//! Rowing conditions service for the Schuylkill reach.
//!
//! Fuses live gauge readings, weather forecasts, and the national river
//! forecast into a 0–10 rowability score, and projects that score across
//! short-term, standard, and extended horizons. The scoring and
//! projection core (`score`, `forecast`) is pure and clock-injected; the
//! acquisition layer (`ingest`, `refresh`) feeds it through an
//! atomic-snapshot document store.

pub mod config;
pub mod forecast;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod refresh;
pub mod score;
pub mod sites;
pub mod store;
