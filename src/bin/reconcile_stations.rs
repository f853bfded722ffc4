//! Station Reconciler: reads the stops already written by `build_timetable`
//! plus the curated station manifest, and writes `transfer_index.json` and
//! `station_index.json`.

use std::fs;

use railquery::config::Config;
use railquery::reconcile;

const MANIFEST_FILE: &str = "stations.csv";

fn main() {
    env_logger::init();

    let config = Config::from_env();
    let stops_path = config.artifacts_dir.join("stops.json");
    let stops: std::collections::HashMap<String, raptor_core::model::Stop> =
        serde_json::from_str(&fs::read_to_string(&stops_path).expect("failed to read stops.json, run build_timetable first"))
            .expect("stops.json is malformed");

    let manifest_path = config.manifest_dir.join(MANIFEST_FILE);
    let manifest_stations = reconcile::manifest::load(&manifest_path).unwrap_or_else(|err| {
        log::warn!("{err}, proceeding with an empty manifest");
        Vec::new()
    });

    log::info!("reconciling {} stops against {} manifest stations", stops.len(), manifest_stations.len());
    let reconciled = reconcile::reconcile(&stops, &manifest_stations);
    log::info!(
        "built {} stations, transfer index covers {} stops",
        reconciled.station_index.stations.len(),
        reconciled.transfer_index.0.len()
    );

    railquery::persist::save_reconciliation(&config.artifacts_dir, &reconciled.transfer_index, &reconciled.station_index)
        .expect("failed to write reconciliation artifacts");
    log::info!("wrote reconciliation artifacts to {}", config.artifacts_dir.display());
}
