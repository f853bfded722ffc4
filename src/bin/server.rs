//! Loads all persisted artifacts and serves the HTTP surface, mirroring the
//! teacher's `webserver.rs` startup sequence.

use std::sync::Arc;

use railquery::config::Config;
use railquery::http::{self, AppState};
use railquery::persist;
use railquery::query::QueryEngine;
use raptor_core::snapshot::TimetableSnapshot;

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = Config::from_env();

    let timetable = persist::load_timetable(&config.artifacts_dir).unwrap_or_else(|err| {
        log::error!("{err}");
        std::process::exit(1);
    });
    let operators = timetable
        .routes_info
        .values()
        .map(|route| route.operator)
        .collect::<std::collections::HashSet<_>>()
        .into_iter()
        .collect::<Vec<_>>();
    let tariffs = persist::load_tariffs(&config.artifacts_dir).unwrap_or_else(|err| {
        log::warn!("{err}, starting with an empty tariff table");
        Vec::new()
    });

    let snapshot = Arc::new(TimetableSnapshot::new(timetable));
    let engine = QueryEngine::new(snapshot);
    let state = Arc::new(AppState { engine, tariffs, operators });

    log::info!("starting web server on port {}", config.port);
    warp::serve(http::routes(state, &config.static_dir)).run(([127, 0, 0, 1], config.port)).await;
}
