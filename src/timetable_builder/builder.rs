//! Orchestrates the Feed Reader and the rest of the timetable builder:
//! reads every operator's directory under `feeds_dir`, repairs trips,
//! classifies train types, and assembles the route-shaped indexes into one
//! `Timetable`.

use std::collections::HashMap;
use std::path::Path;

use raptor_core::ids::{prefixed, RouteId};
use raptor_core::model::{CalendarIndex, Operator, Route, Trip};
use raptor_core::timetable::Timetable;

use super::{calendar, repair, route_index, trainclass};
use crate::feed::{log_skip_count, read_operator_feed};

pub const OPERATORS: &[Operator] = &[
    Operator::Sncf,
    Operator::Trenitalia,
    Operator::Eurostar,
    Operator::Sncb,
    Operator::Db,
    Operator::Renfe,
    Operator::OuigoEs,
];

pub fn build(feeds_dir: &Path) -> Timetable {
    let mut timetable = Timetable::default();
    let mut route_trips: HashMap<RouteId, Vec<Trip>> = HashMap::new();
    let mut calendar_index = CalendarIndex::default();

    for &operator in OPERATORS {
        let dir = feeds_dir.join(operator.code());
        if !dir.exists() {
            log::warn!("{}: no feed directory at {}, skipping operator", operator.code(), dir.display());
            continue;
        }
        let code = operator.code();
        let mut feed = read_operator_feed(&dir, operator);

        for stop in feed.stops {
            timetable.stops.insert(stop.id.clone(), stop);
        }

        let route_short_names: HashMap<&str, &str> =
            feed.kept_routes.iter().map(|r| (r.route_id.as_str(), r.route_short_name.as_str())).collect();
        for route in &feed.kept_routes {
            let route_id = prefixed(code, &route.route_id);
            timetable.routes_info.insert(
                route_id.clone(),
                Route {
                    id: route_id,
                    short_name: route.route_short_name.clone(),
                    long_name: route.route_long_name.clone(),
                    route_type: route.route_type.clone(),
                    operator,
                },
            );
        }

        let mut malformed_trips = 0u32;
        for raw_trip in &feed.trips {
            let trip_id = prefixed(code, &raw_trip.trip_id);
            let Some(entries) = feed.stop_times_by_trip.remove(&trip_id) else {
                continue;
            };
            let repaired = repair::repair(entries);
            if repaired.is_empty() {
                malformed_trips += 1;
                continue;
            }
            let route_id = prefixed(code, &raw_trip.route_id);
            let short_name = route_short_names.get(raw_trip.route_id.as_str()).copied().unwrap_or("");
            let train_type = trainclass::classify(operator, &repaired[0].stop_id, short_name, &raw_trip.trip_id);
            let trip = Trip {
                id: trip_id,
                route_id: route_id.clone(),
                service_id: prefixed(code, &raw_trip.service_id),
                operator,
                train_type,
                first_departure_time: repaired[0].departure_time,
                stop_times: repaired,
            };
            if !trip.is_well_formed() {
                malformed_trips += 1;
                continue;
            }
            route_trips.entry(route_id).or_default().push(trip);
        }
        log_skip_count(&format!("{code} trips"), malformed_trips);

        calendar::expand(code, &feed.calendar, &feed.calendar_dates, &mut calendar_index);
    }

    let (route_stops, routes_by_stop) = route_index::finalize(&mut route_trips);
    timetable.route_trips = route_trips;
    timetable.route_stops = route_stops;
    timetable.routes_by_stop = routes_by_stop;
    timetable.calendar_index = calendar_index;
    timetable
}
