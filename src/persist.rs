//! Loads and saves the persisted JSON artifacts listed in the external
//! interfaces: one directory, one document per file, each read or written
//! as a whole rather than streamed.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use raptor_core::ids::{RouteId, StopId};
use raptor_core::model::{CalendarIndex, Operator, Route, Stop, Trip};
use raptor_core::station::StationIndex;
use raptor_core::timetable::Timetable;
use raptor_core::transfer::{RawTransferEntry, TransferIndex};

use crate::error::ArtifactError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TariffRow {
    pub origin: StopId,
    pub destination: StopId,
    pub product: String,
    pub class: String,
    pub profile: String,
    pub price_cents: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    pub built_at: String,
    pub operators: Vec<Operator>,
    pub stop_count: usize,
    pub trip_count: usize,
}

fn read_json<T: for<'de> Deserialize<'de>>(dir: &Path, filename: &str) -> Result<T, ArtifactError> {
    let path = dir.join(filename);
    let contents = fs::read_to_string(&path).map_err(|source| ArtifactError::Io { path: path.clone(), source })?;
    serde_json::from_str(&contents).map_err(|source| ArtifactError::Json { path, source })
}

fn write_json<T: Serialize>(dir: &Path, filename: &str, value: &T) -> Result<(), ArtifactError> {
    let path = dir.join(filename);
    let contents = serde_json::to_string_pretty(value).map_err(|source| ArtifactError::Json { path: path.clone(), source })?;
    fs::write(&path, contents).map_err(|source| ArtifactError::Io { path, source })
}

/// Writes everything the Timetable Builder owns: `stops.json` through
/// `calendar_index.json`, plus `meta.json`. The Station Reconciler writes
/// `transfer_index.json` and `station_index.json` in a separate pass.
pub fn save_timetable(dir: &Path, timetable: &Timetable, operators: &[Operator]) -> Result<(), ArtifactError> {
    fs::create_dir_all(dir).map_err(|source| ArtifactError::Io { path: dir.to_path_buf(), source })?;
    write_json(dir, "stops.json", &timetable.stops)?;
    write_json(dir, "routes_info.json", &timetable.routes_info)?;
    write_json(dir, "routes_by_stop.json", &timetable.routes_by_stop)?;
    write_json(dir, "route_stops.json", &timetable.route_stops)?;
    write_json(dir, "route_trips.json", &timetable.route_trips)?;
    write_json(dir, "calendar_index.json", &timetable.calendar_index.0)?;

    let trip_count: usize = timetable.route_trips.values().map(Vec::len).sum();
    let meta = Meta {
        built_at: String::new(),
        operators: operators.to_vec(),
        stop_count: timetable.stops.len(),
        trip_count,
    };
    write_json(dir, "meta.json", &meta)
}

pub fn save_reconciliation(dir: &Path, transfer_index: &TransferIndex, station_index: &StationIndex) -> Result<(), ArtifactError> {
    let raw: HashMap<StopId, Vec<RawTransferEntry>> = transfer_index
        .0
        .iter()
        .map(|(stop, links)| {
            let entries = links
                .iter()
                .map(|link| match link.category {
                    raptor_core::transfer::TransferCategory::InterCitySameMetro => RawTransferEntry::Tagged {
                        id: link.sibling.clone(),
                        inter_city: true,
                    },
                    _ => RawTransferEntry::Plain(link.sibling.clone()),
                })
                .collect();
            (stop.clone(), entries)
        })
        .collect();
    write_json(dir, "transfer_index.json", &raw)?;
    write_json(dir, "station_index.json", station_index)
}

pub fn save_tariffs(dir: &Path, tariffs: &[TariffRow]) -> Result<(), ArtifactError> {
    write_json(dir, "tariffs.json", &tariffs.to_vec())
}

/// Loads everything the server needs at startup. Every file in this list is
/// required; a missing one is a fatal `ArtifactError`, matching the
/// "MissingArtifact" error kind — a server with half a timetable never
/// starts.
pub fn load_timetable(dir: &Path) -> Result<Timetable, ArtifactError> {
    if !dir.exists() {
        return Err(ArtifactError::MissingDirectory(dir.to_path_buf()));
    }
    let stops: HashMap<StopId, Stop> = read_json(dir, "stops.json")?;
    let routes_info: HashMap<RouteId, Route> = read_json(dir, "routes_info.json")?;
    let routes_by_stop: HashMap<StopId, HashSet<RouteId>> = read_json(dir, "routes_by_stop.json")?;
    let route_stops: HashMap<RouteId, Vec<StopId>> = read_json(dir, "route_stops.json")?;
    let route_trips: HashMap<RouteId, Vec<Trip>> = read_json(dir, "route_trips.json")?;
    let calendar_raw: HashMap<String, HashSet<String>> = read_json(dir, "calendar_index.json")?;

    let transfer_raw: HashMap<StopId, Vec<RawTransferEntry>> = read_json(dir, "transfer_index.json")?;
    let station_index: StationIndex = read_json(dir, "station_index.json")?;

    Ok(Timetable {
        stops,
        routes_info,
        routes_by_stop,
        route_stops,
        route_trips,
        calendar_index: CalendarIndex(calendar_raw),
        transfer_index: raptor_core::transfer::normalize(transfer_raw),
        station_index,
    })
}

pub fn load_tariffs(dir: &Path) -> Result<Vec<TariffRow>, ArtifactError> {
    read_json(dir, "tariffs.json")
}
