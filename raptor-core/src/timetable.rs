use std::collections::{HashMap, HashSet};

use crate::ids::{RouteId, StopId};
use crate::model::{CalendarIndex, Route, Stop, Trip};
use crate::station::StationIndex;
use crate::transfer::TransferIndex;

/// The fully assembled, read-only timetable the query engine is built over.
/// Built once by the offline pipeline (Feed Reader + Timetable Builder +
/// Station Reconciler), loaded once at server startup.
#[derive(Debug, Clone, Default)]
pub struct Timetable {
    pub stops: HashMap<StopId, Stop>,
    pub routes_info: HashMap<RouteId, Route>,
    pub routes_by_stop: HashMap<StopId, HashSet<RouteId>>,
    pub route_stops: HashMap<RouteId, Vec<StopId>>,
    pub route_trips: HashMap<RouteId, Vec<Trip>>,
    pub calendar_index: CalendarIndex,
    pub transfer_index: TransferIndex,
    pub station_index: StationIndex,
}

/// A reference to one stop visit: which route, which trip within
/// `route_trips[route]`, and which position within that trip's
/// `stop_times`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TripStopRef {
    pub route_id_idx: usize,
    pub trip_idx: usize,
    pub stop_idx: usize,
}

/// `stopToTrips[stopId]`: every `(route, trip, index-within-trip)` at which
/// a stop is visited. Built exactly once over the full, unfiltered-by-date
/// timetable.
#[derive(Debug, Clone, Default)]
pub struct StopToTrips {
    pub route_ids: Vec<RouteId>,
    pub by_stop: HashMap<StopId, Vec<TripStopRef>>,
}

impl StopToTrips {
    pub fn entries_for(&self, stop: &str) -> &[TripStopRef] {
        self.by_stop.get(stop).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn route_id(&self, r: &TripStopRef) -> &RouteId {
        &self.route_ids[r.route_id_idx]
    }
}

impl Timetable {
    /// Build the startup-time `stopToTrips` index over every trip in every
    /// route, regardless of which services are active on any particular
    /// date — date filtering happens later, against this full index.
    pub fn build_stop_to_trips(&self) -> StopToTrips {
        let mut route_ids: Vec<RouteId> = self.route_trips.keys().cloned().collect();
        route_ids.sort();
        let mut by_stop: HashMap<StopId, Vec<TripStopRef>> = HashMap::new();
        for (route_id_idx, route_id) in route_ids.iter().enumerate() {
            if let Some(trips) = self.route_trips.get(route_id) {
                for (trip_idx, trip) in trips.iter().enumerate() {
                    for (stop_idx, stop_time) in trip.stop_times.iter().enumerate() {
                        by_stop.entry(stop_time.stop_id.clone()).or_default().push(TripStopRef {
                            route_id_idx,
                            trip_idx,
                            stop_idx,
                        });
                    }
                }
            }
        }
        StopToTrips { route_ids, by_stop }
    }

    /// Build a `stopToTrips` index restricted to trips whose service is
    /// active on `date`, starting from the full index so trip order (and
    /// hence tie-breaking within a round) is preserved.
    pub fn filter_stop_to_trips_for_date(&self, full: &StopToTrips, date: &str) -> StopToTrips {
        let active = self.calendar_index.active_services(date);
        let mut by_stop: HashMap<StopId, Vec<TripStopRef>> = HashMap::new();
        for (stop_id, refs) in &full.by_stop {
            let filtered: Vec<TripStopRef> = refs
                .iter()
                .copied()
                .filter(|r| {
                    let route_id = &full.route_ids[r.route_id_idx];
                    self.route_trips
                        .get(route_id)
                        .and_then(|trips| trips.get(r.trip_idx))
                        .map(|trip| active.contains(&trip.service_id))
                        .unwrap_or(false)
                })
                .collect();
            if !filtered.is_empty() {
                by_stop.insert(stop_id.clone(), filtered);
            }
        }
        StopToTrips {
            route_ids: full.route_ids.clone(),
            by_stop,
        }
    }

    pub fn trip(&self, r: &TripStopRef, full: &StopToTrips) -> Option<&Trip> {
        let route_id = &full.route_ids[r.route_id_idx];
        self.route_trips.get(route_id).and_then(|trips| trips.get(r.trip_idx))
    }

    /// Checks the post-ingestion invariants from the testable-properties
    /// section: non-decreasing stop times, referential integrity between
    /// routes/trips/stops, and `routesByStop` / `routeStops` agreement.
    /// Returns every violation found rather than stopping at the first.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for (route_id, trips) in &self.route_trips {
            if !self.routes_info.contains_key(route_id) {
                problems.push(format!("route {route_id} referenced from routeTrips but missing from routesInfo"));
            }
            for trip in trips {
                if !trip.is_well_formed() {
                    problems.push(format!("trip {} is empty or has decreasing times", trip.id));
                }
                for st in &trip.stop_times {
                    if !self.stops.contains_key(&st.stop_id) {
                        problems.push(format!("trip {} references unknown stop {}", trip.id, st.stop_id));
                    }
                }
            }
        }
        for (route_id, stops) in &self.route_stops {
            for stop_id in stops {
                if !self.stops.contains_key(stop_id) {
                    problems.push(format!("routeStops[{route_id}] references unknown stop {stop_id}"));
                }
            }
        }
        for (route_id, stops) in &self.route_stops {
            for stop_id in stops {
                let has_back_ref = self
                    .routes_by_stop
                    .get(stop_id)
                    .map(|routes| routes.contains(route_id))
                    .unwrap_or(false);
                if !has_back_ref {
                    problems.push(format!("routesByStop[{stop_id}] missing back-reference to {route_id}"));
                }
            }
        }
        for (stop_id, routes) in &self.routes_by_stop {
            for route_id in routes {
                let forward_ok = self
                    .route_stops
                    .get(route_id)
                    .map(|stops| stops.contains(stop_id))
                    .unwrap_or(false);
                if !forward_ok {
                    problems.push(format!("routesByStop[{stop_id}] names {route_id} which does not list it in routeStops"));
                }
            }
        }
        problems
    }
}
