//! Daemon entry point: load configuration, start the logger, and drive
//! the per-source refresh schedules.

use std::sync::Arc;

use chrono::Utc;

use rowcast_service::config::ServiceConfig;
use rowcast_service::logging::{self, DataSource, LogLevel};
use rowcast_service::refresh::{self, SourceGuards};
use rowcast_service::sites;
use rowcast_service::store::SnapshotStore;

/// How often the scheduler loop checks for due jobs.
const TICK_SECS: u64 = 30;

fn main() {
    dotenv::dotenv().ok();

    let config = match ServiceConfig::load() {
        Ok(config) => Arc::new(config),
        Err(err) => {
            eprintln!("failed to load configuration: {}", err);
            std::process::exit(1);
        }
    };

    logging::init_logger(
        LogLevel::from_name(&config.log.level),
        config.log.file.as_deref(),
    );

    let reach = sites::primary_reach();
    logging::info(
        DataSource::System,
        Some(reach.id),
        &format!("starting rowcast service for {}", reach.name),
    );

    let store = Arc::new(SnapshotStore::new());
    let guards = Arc::new(SourceGuards::new());
    let mut schedules = refresh::job_schedules(&config);

    loop {
        let now = Utc::now();
        for schedule in &mut schedules {
            if !schedule.due(now) {
                continue;
            }
            schedule.last_run = Some(now);

            let kind = schedule.kind;
            let store = Arc::clone(&store);
            let guards = Arc::clone(&guards);
            let config = Arc::clone(&config);
            // Each job runs on its own thread so one slow upstream never
            // delays another source's cycle; the per-source guard drops
            // any trigger that catches its predecessor still running.
            std::thread::spawn(move || {
                refresh::run_guarded(&guards, kind, &store, &config, Utc::now());
            });
        }
        std::thread::sleep(std::time::Duration::from_secs(TICK_SECS));
    }
}
