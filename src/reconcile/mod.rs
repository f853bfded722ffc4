//! Station reconciliation: produces the transfer index (walkable sibling
//! stops, categorized) and the station index (logical stations spanning
//! operators) consumed by the query engine.

pub mod manifest;
pub mod station_index;
pub mod transfer_index;

use std::collections::HashMap;

use raptor_core::model::Stop;
use raptor_core::station::StationIndex;
use raptor_core::transfer::TransferIndex;

use manifest::ManifestStation;

pub struct Reconciled {
    pub transfer_index: TransferIndex,
    pub station_index: StationIndex,
}

pub fn reconcile(stops: &HashMap<String, Stop>, manifest_stations: &[ManifestStation]) -> Reconciled {
    let transfer_index = transfer_index::build(stops, manifest_stations);
    let station_index = station_index::build(stops, manifest_stations, &transfer_index);
    Reconciled { transfer_index, station_index }
}
