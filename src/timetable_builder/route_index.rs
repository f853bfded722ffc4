//! Builds the route-shaped indexes round-based search needs directly:
//! `routeStops` (the longest observed stop sequence), `routeTrips` (sorted
//! by first departure), and the `routesByStop` back-reference.

use std::collections::{HashMap, HashSet};

use raptor_core::ids::{RouteId, StopId};
use raptor_core::model::Trip;

pub fn finalize(route_trips: &mut HashMap<RouteId, Vec<Trip>>) -> (HashMap<RouteId, Vec<StopId>>, HashMap<StopId, HashSet<RouteId>>) {
    let mut route_stops = HashMap::new();
    let mut routes_by_stop: HashMap<StopId, HashSet<RouteId>> = HashMap::new();

    for (route_id, trips) in route_trips.iter_mut() {
        trips.sort_by_key(|t| t.first_departure_time);

        let longest = trips.iter().max_by_key(|t| t.stop_times.len());
        let stops: Vec<StopId> = longest.map(|t| t.stop_times.iter().map(|st| st.stop_id.clone()).collect()).unwrap_or_default();
        for stop_id in &stops {
            routes_by_stop.entry(stop_id.clone()).or_default().insert(route_id.clone());
        }
        route_stops.insert(route_id.clone(), stops);
    }

    (route_stops, routes_by_stop)
}
