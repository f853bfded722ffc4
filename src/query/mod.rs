//! Startup-time derived indexes the query engine runs request handling
//! against: the stop/city autocomplete suggesters and the display-name
//! lookup. The round-based search itself lives in `raptor_core`; this
//! module only wires the timetable into the extra structures a live
//! server needs on top of it.

use std::collections::HashMap;
use std::sync::Arc;

use raptor_core::ids::StopId;
use raptor_core::snapshot::TimetableSnapshot;
use raptor_core::station::StationIndex;

use crate::suggester::Suggester;

/// `Suggester<T>` requires `T: Copy`, which ruled out `Suggester<StopId>`
/// once stop ids became owned `String`s — indexing into a stable
/// `Vec<StopId>` keeps the teacher's TST wrapper unchanged.
pub struct QueryEngine {
    pub snapshot: Arc<TimetableSnapshot>,
    stop_ids: Vec<StopId>,
    stop_suggester: Suggester<usize>,
    city_names: Vec<String>,
    city_suggester: Suggester<usize>,
    stop_name_map: HashMap<StopId, String>,
}

impl QueryEngine {
    pub fn new(snapshot: Arc<TimetableSnapshot>) -> QueryEngine {
        let stop_ids: Vec<StopId> = snapshot.timetable.stops.keys().cloned().collect();

        let stop_name_map = build_stop_name_map(&snapshot.timetable.stops, &snapshot.timetable.station_index);

        let mut stop_suggester = Suggester::new();
        for (idx, stop_id) in stop_ids.iter().enumerate() {
            if let Some(name) = stop_name_map.get(stop_id) {
                stop_suggester.insert(name, idx);
            }
        }

        let city_names: Vec<String> = snapshot
            .timetable
            .station_index
            .city_groups()
            .into_iter()
            .map(|group| group.city)
            .collect();
        let mut city_suggester = Suggester::new();
        for (idx, city) in city_names.iter().enumerate() {
            city_suggester.insert(city, idx);
        }

        QueryEngine {
            snapshot,
            stop_ids,
            stop_suggester,
            city_names,
            city_suggester,
            stop_name_map,
        }
    }

    pub fn stop_name(&self, stop_id: &str) -> Option<&str> {
        self.stop_name_map.get(stop_id).map(String::as_str)
    }

    /// Resolve a free-text query against the stop autocomplete index,
    /// returning the matching stop ids with their display names.
    pub fn suggest_stops(&self, query: &str, limit: usize) -> Vec<(StopId, String)> {
        let mut results: Vec<usize> = self.stop_suggester.search(query).into_iter().collect();
        results.sort();
        results
            .into_iter()
            .take(limit)
            .map(|idx| (self.stop_ids[idx].clone(), self.stop_name_map.get(&self.stop_ids[idx]).cloned().unwrap_or_default()))
            .collect()
    }

    pub fn suggest_cities(&self, query: &str, limit: usize) -> Vec<String> {
        let mut results: Vec<usize> = self.city_suggester.search(query).into_iter().collect();
        results.sort();
        results.into_iter().take(limit).map(|idx| self.city_names[idx].clone()).collect()
    }

    /// Every member stop of every station sharing `city`'s name, used to
    /// resolve a "from city" query into a set of origin stop ids.
    pub fn stops_in_city(&self, city: &str) -> Vec<StopId> {
        self.snapshot
            .timetable
            .station_index
            .stations
            .iter()
            .filter(|station| station.city.eq_ignore_ascii_case(city))
            .flat_map(|station| station.member_stop_ids.iter().cloned())
            .collect()
    }
}

/// Manifest-derived display names (carried on the station index) override
/// the raw feed name where available.
fn build_stop_name_map(
    stops: &HashMap<StopId, raptor_core::model::Stop>,
    station_index: &StationIndex,
) -> HashMap<StopId, String> {
    let mut names: HashMap<StopId, String> = stops.iter().map(|(id, stop)| (id.clone(), stop.name.clone())).collect();
    for station in &station_index.stations {
        for stop_id in &station.member_stop_ids {
            names.insert(stop_id.clone(), station.display_name.clone());
        }
    }
    names
}
