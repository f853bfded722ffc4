//! Round-based (RAPTOR-style) shortest path search over a [`TimetableSnapshot`].

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::ids::{RouteId, StopId, TripId};
use crate::model::{Operator, TrainType};
use crate::snapshot::TimetableSnapshot;
use crate::timetable::Timetable;
use crate::time::{Duration, Time};
use crate::transfer::TransferCategory;

const MAX_ROUNDS: usize = 5;
const ENUMERATION_HORIZON: i32 = 14 * 60 * 60;
const MAX_EMPTY_ADVANCES: usize = 4;
const ADVANCE_STEP: i32 = 30 * 60;

#[derive(Debug, Clone, Copy)]
pub struct SearchRequest<'a> {
    pub origins: &'a [StopId],
    pub destinations: &'a [StopId],
    pub start_time: Time,
    pub date: &'a str,
    pub train_types: Option<&'a HashSet<TrainType>>,
}

/// A predecessor-map entry: either a boarded trip segment or a walking
/// transfer. Modeled as a sum type, not a flag on a shared record, because
/// the two shapes carry genuinely different fields.
#[derive(Debug, Clone)]
pub enum ParentEntry {
    Ride {
        board_stop: StopId,
        board_dep: Time,
        arr: Time,
        trip_id: TripId,
        route_id: RouteId,
        train_type: TrainType,
        operator: Operator,
    },
    Transfer {
        board_stop: StopId,
        departure: Time,
        arrival: Time,
        category: TransferCategory,
    },
}

impl ParentEntry {
    fn board_stop(&self) -> &StopId {
        match self {
            ParentEntry::Ride { board_stop, .. } => board_stop,
            ParentEntry::Transfer { board_stop, .. } => board_stop,
        }
    }
}

#[derive(Debug, Default)]
pub struct SearchState {
    pub tau_best: HashMap<StopId, Time>,
    pub parent: HashMap<StopId, ParentEntry>,
}

/// Trips from operator Trenitalia are recorded in Italian local time but
/// merged onto a France-local timeline; this is applied at scan time and
/// never stored. Summer (query months 4-9) adds 2h, otherwise 1h; a
/// dateless query is treated as winter (+1h).
fn tz_adjustment(operator: Operator, date: &str) -> Duration {
    if operator != Operator::Trenitalia {
        return Duration::seconds(0);
    }
    let month: u32 = date.get(5..7).and_then(|s| s.parse().ok()).unwrap_or(0);
    if (4..=9).contains(&month) {
        Duration::minutes(120)
    } else {
        Duration::minutes(60)
    }
}

fn adjusted(time: Time, operator: Operator, date: &str) -> Time {
    time + tz_adjustment(operator, date)
}

/// Run the round-based core once for a single `startTime`. Populates
/// `tau_best`/`parent` for every stop reachable from `req.origins`, not just
/// `req.destinations` — callers may query any stop's best arrival, which is
/// what makes `explore` and multi-destination `search` reuse this directly.
pub fn round_based_search(snapshot: &TimetableSnapshot, req: &SearchRequest) -> SearchState {
    let stop_to_trips = snapshot.stop_to_trips_for_date(req.date);
    let timetable: &Timetable = &snapshot.timetable;
    let transfer_index = &timetable.transfer_index;

    let mut state = SearchState::default();
    let mut marked: HashSet<StopId> = HashSet::new();

    for origin in req.origins {
        state.tau_best.insert(origin.clone(), req.start_time);
        marked.insert(origin.clone());
    }
    // Seed every origin's transfer neighbours, including inter-city ones:
    // reachable, but (being absent from `req.origins`) boarding from one
    // will be counted as a transfer at reconstruction time.
    for origin in req.origins {
        for link in transfer_index.neighbours(origin) {
            let candidate = req.start_time + link.category.min_dwell();
            let improves = state
                .tau_best
                .get(&link.sibling)
                .map(|&existing| candidate < existing)
                .unwrap_or(true);
            if improves {
                state.tau_best.insert(link.sibling.clone(), candidate);
                state.parent.insert(
                    link.sibling.clone(),
                    ParentEntry::Transfer {
                        board_stop: origin.clone(),
                        departure: req.start_time,
                        arrival: candidate,
                        category: link.category,
                    },
                );
                marked.insert(link.sibling.clone());
            }
        }
    }

    for _round in 0..MAX_ROUNDS {
        if marked.is_empty() {
            break;
        }
        let scanning: Vec<StopId> = marked.iter().cloned().collect();
        marked.clear();
        // Frozen view of arrival times at the start of the round: boarding
        // decisions this round must not see improvements made earlier in
        // the same round, only those carried in from the previous one.
        let starting_tau = state.tau_best.clone();
        let mut tau_cur: HashMap<StopId, Time> = HashMap::new();

        for stop in &scanning {
            let Some(&arrival_here) = starting_tau.get(stop) else {
                continue;
            };
            for tref in stop_to_trips.entries_for(stop) {
                let Some(trip) = timetable.trip(tref, &stop_to_trips) else {
                    continue;
                };
                let idx = tref.stop_idx;
                let board_time = adjusted(trip.stop_times[idx].departure_time, trip.operator, req.date);
                if arrival_here > board_time {
                    continue; // too late to board this trip here
                }
                for next_idx in (idx + 1)..trip.stop_times.len() {
                    let st = &trip.stop_times[next_idx];
                    let arr = adjusted(st.arrival_time, trip.operator, req.date);
                    let improves = state
                        .tau_best
                        .get(&st.stop_id)
                        .map(|&existing| arr < existing)
                        .unwrap_or(true);
                    if improves {
                        state.tau_best.insert(st.stop_id.clone(), arr);
                        state.parent.insert(
                            st.stop_id.clone(),
                            ParentEntry::Ride {
                                board_stop: stop.clone(),
                                board_dep: board_time,
                                arr,
                                trip_id: trip.id.clone(),
                                route_id: trip.route_id.clone(),
                                train_type: trip.train_type,
                                operator: trip.operator,
                            },
                        );
                        tau_cur.insert(st.stop_id.clone(), arr);
                    }
                }
            }
        }

        for (stop, &arrival_here) in &tau_cur {
            for link in transfer_index.neighbours(stop) {
                let candidate = arrival_here + link.category.min_dwell();
                let improves = state
                    .tau_best
                    .get(&link.sibling)
                    .map(|&existing| candidate < existing)
                    .unwrap_or(true);
                if improves {
                    state.tau_best.insert(link.sibling.clone(), candidate);
                    state.parent.insert(
                        link.sibling.clone(),
                        ParentEntry::Transfer {
                            board_stop: stop.clone(),
                            departure: arrival_here,
                            arrival: candidate,
                            category: link.category,
                        },
                    );
                    marked.insert(link.sibling.clone());
                }
            }
        }
        marked.extend(tau_cur.into_keys());
    }

    state
}

#[derive(Debug, Clone, Serialize)]
pub struct Leg {
    pub from: StopId,
    pub to: StopId,
    pub dep: Time,
    pub arr: Time,
    pub trip_id: TripId,
    pub route_id: RouteId,
    pub operator: Operator,
    pub train_type: TrainType,
    pub route_name: String,
    pub duration: Duration,
}

#[derive(Debug, Clone, Serialize)]
pub struct Journey {
    pub legs: Vec<Leg>,
    pub departure: Time,
    pub arrival: Time,
    pub duration: Duration,
    pub transfers: usize,
    pub train_types: HashSet<TrainType>,
}

/// Walk `parent` back from `destination` to any origin, collapsing
/// transfer-only runs into the leg that follows them and discarding the
/// candidate if the walk revisits a stop (a cycle through transfer edges).
/// Transfer count is (boarded legs - 1) plus one for every inter-city
/// transfer edge used — origin-adjacent same-station transfers are free,
/// matching the seeding rule that only inter-city neighbours are excluded
/// from the origin set.
pub fn reconstruct(state: &SearchState, timetable: &Timetable, origins: &HashSet<StopId>, destination: &str) -> Option<Journey> {
    let arrival = *state.tau_best.get(destination)?;
    let mut visited = HashSet::new();
    let mut cur = destination.to_string();
    let mut edges: Vec<(StopId, ParentEntry)> = Vec::new();
    while !origins.contains(&cur) {
        if !visited.insert(cur.clone()) {
            return None; // CyclicParent: discard this candidate
        }
        let entry = state.parent.get(&cur)?.clone();
        let next = entry.board_stop().clone();
        edges.push((cur, entry));
        cur = next;
    }
    edges.reverse();

    let mut legs = Vec::new();
    let mut intercity_transfers = 0usize;
    let mut pending_from: Option<StopId> = None;
    let mut pending_dep: Option<Time> = None;
    for (to_stop, entry) in edges {
        match entry {
            ParentEntry::Transfer { board_stop, departure, category, .. } => {
                if category == TransferCategory::InterCitySameMetro {
                    intercity_transfers += 1;
                }
                if pending_from.is_none() {
                    pending_from = Some(board_stop);
                    pending_dep = Some(departure);
                }
            }
            ParentEntry::Ride {
                board_stop,
                board_dep,
                arr,
                trip_id,
                route_id,
                train_type,
                operator,
            } => {
                let from = pending_from.take().unwrap_or(board_stop);
                let dep = pending_dep.take().unwrap_or(board_dep);
                let route_name = timetable
                    .routes_info
                    .get(&route_id)
                    .map(|r| r.short_name.clone())
                    .unwrap_or_default();
                legs.push(Leg {
                    from,
                    to: to_stop,
                    dep,
                    arr,
                    trip_id,
                    route_id,
                    operator,
                    train_type,
                    route_name,
                    duration: arr - dep,
                });
            }
        }
    }
    if legs.is_empty() {
        return None; // a pure walk from origin is not a journey
    }
    let departure = legs[0].dep;
    let transfers = legs.len().saturating_sub(1) + intercity_transfers;
    let train_types = legs.iter().map(|l| l.train_type).collect();
    Some(Journey {
        legs,
        departure,
        arrival,
        duration: arrival - departure,
        transfers,
        train_types,
    })
}

fn city_key(timetable: &Timetable, stop_to_station: &HashMap<StopId, usize>, stop: &str) -> String {
    match stop_to_station.get(stop) {
        Some(&idx) => {
            let station = &timetable.station_index.stations[idx];
            format!("{}/{}", station.city, station.country)
        }
        None => stop.to_string(),
    }
}

/// After sorting, merge journeys that arrive at different stops of the same
/// `(city, country)` with the same departure time, keeping the shorter one.
fn dedup_by_arrival_city(timetable: &Timetable, journeys: Vec<Journey>) -> Vec<Journey> {
    let stop_to_station = timetable.station_index.stop_to_station();
    let mut slot_of: HashMap<(Time, String), usize> = HashMap::new();
    let mut kept: Vec<Journey> = Vec::new();
    for journey in journeys {
        let last_stop = &journey.legs.last().expect("non-empty legs").to;
        let key = (journey.departure, city_key(timetable, &stop_to_station, last_stop));
        match slot_of.get(&key) {
            Some(&idx) => {
                if journey.duration < kept[idx].duration {
                    kept[idx] = journey;
                }
            }
            None => {
                slot_of.insert(key, kept.len());
                kept.push(journey);
            }
        }
    }
    kept
}

/// Repeats the round-based core at successively later start times to
/// produce a ranked sequence of Pareto-optimal journeys.
pub fn search_journeys(snapshot: &TimetableSnapshot, req: &SearchRequest, limit: usize) -> Vec<Journey> {
    let origins: HashSet<StopId> = req.origins.iter().cloned().collect();
    let mut all = Vec::new();
    let mut seen_trip_sequences: HashSet<Vec<TripId>> = HashSet::new();
    let mut start = req.start_time;
    let horizon = req.start_time + Duration::seconds(ENUMERATION_HORIZON);
    let mut empty_advances = 0;

    while start < horizon {
        let mut round_req = req.clone();
        round_req.start_time = start;
        let state = round_based_search(snapshot, &round_req);

        let mut max_departure: Option<Time> = None;
        let mut found_new = false;
        for destination in req.destinations {
            if let Some(journey) = reconstruct(&state, &snapshot.timetable, &origins, destination) {
                let sequence: Vec<TripId> = journey.legs.iter().map(|l| l.trip_id.clone()).collect();
                if seen_trip_sequences.insert(sequence) {
                    max_departure = Some(match max_departure {
                        Some(existing) if existing >= journey.departure => existing,
                        _ => journey.departure,
                    });
                    all.push(journey);
                    found_new = true;
                }
            }
        }

        if found_new {
            empty_advances = 0;
            start = max_departure.expect("found_new implies at least one departure") + Duration::seconds(1);
        } else {
            empty_advances += 1;
            if empty_advances >= MAX_EMPTY_ADVANCES {
                break;
            }
            start = start + Duration::seconds(ADVANCE_STEP);
        }
    }

    if let Some(allow) = req.train_types {
        all.retain(|j| j.train_types.iter().all(|t| allow.contains(t)));
    }
    all.sort_by(|a, b| {
        a.transfers
            .cmp(&b.transfers)
            .then_with(|| a.duration.cmp(&b.duration))
            .then_with(|| a.departure.cmp(&b.departure))
    });
    let mut deduped = dedup_by_arrival_city(&snapshot.timetable, all);
    deduped.truncate(limit);
    deduped
}

/// Seeds the search at 8 discrete start times across the service day and
/// returns, per reachable non-origin stop, the shortest journey duration
/// found at any of the seeds.
pub fn explore(snapshot: &TimetableSnapshot, origins: &[StopId], date: &str) -> HashMap<StopId, Duration> {
    const EXPLORE_HOURS: [u32; 8] = [5, 7, 9, 11, 13, 15, 17, 19];
    let origin_set: HashSet<StopId> = origins.iter().cloned().collect();
    let mut best: HashMap<StopId, Duration> = HashMap::new();
    for hour in EXPLORE_HOURS {
        let start = Time::from_hms(hour, 0, 0);
        let req = SearchRequest {
            origins,
            destinations: &[],
            start_time: start,
            date,
            train_types: None,
        };
        let state = round_based_search(snapshot, &req);
        for (stop, &arrival) in &state.tau_best {
            if origin_set.contains(stop) {
                continue;
            }
            let duration = arrival - start;
            let improves = best.get(stop).map(|&existing| duration < existing).unwrap_or(true);
            if improves {
                best.insert(stop.clone(), duration);
            }
        }
    }
    best
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::{CalendarIndex, Operator, Route, Stop, StopTime, TrainType, Trip};
    use crate::station::StationIndex;
    use crate::transfer::{TransferIndex, TransferLink};

    fn stop(id: &str, lat: f64, lon: f64, op: Operator) -> Stop {
        Stop {
            id: id.to_string(),
            name: id.to_string(),
            lat,
            lon,
            operator: op,
        }
    }

    fn route(id: &str, short: &str, op: Operator) -> Route {
        Route {
            id: id.to_string(),
            short_name: short.to_string(),
            long_name: String::new(),
            route_type: "rail".to_string(),
            operator: op,
        }
    }

    fn st(id: &str, arr: u32, dep: u32) -> StopTime {
        StopTime {
            stop_id: id.to_string(),
            arrival_time: Time::from_seconds(arr),
            departure_time: Time::from_seconds(dep),
        }
    }

    /// Scenario 1: single direct TGV, Paris -> Lyon.
    fn single_direct_tgv_timetable() -> Timetable {
        let mut tt = Timetable::default();
        tt.stops.insert("SNCF:PARIS".into(), stop("SNCF:PARIS", 48.84, 2.37, Operator::Sncf));
        tt.stops.insert("SNCF:LYON".into(), stop("SNCF:LYON", 45.75, 4.85, Operator::Sncf));
        tt.routes_info.insert("SNCF:R1".into(), route("SNCF:R1", "INOUI", Operator::Sncf));
        tt.route_stops.insert("SNCF:R1".into(), vec!["SNCF:PARIS".into(), "SNCF:LYON".into()]);
        tt.route_trips.insert(
            "SNCF:R1".into(),
            vec![Trip {
                id: "SNCF:T1".into(),
                route_id: "SNCF:R1".into(),
                service_id: "SNCF:SVC".into(),
                operator: Operator::Sncf,
                train_type: TrainType::Inoui,
                first_departure_time: Time::from_hms(7, 0, 0),
                stop_times: vec![st("SNCF:PARIS", 25200, 25200), st("SNCF:LYON", 32400, 32400)],
            }],
        );
        let mut cal = CalendarIndex::default();
        cal.add("2025-01-10", "SNCF:SVC".to_string());
        tt.calendar_index = cal;
        tt
    }

    #[test]
    fn scenario_1_single_direct_tgv() {
        let tt = single_direct_tgv_timetable();
        let snapshot = TimetableSnapshot::new(tt);
        let origins = vec!["SNCF:PARIS".to_string()];
        let destinations = vec!["SNCF:LYON".to_string()];
        let req = SearchRequest {
            origins: &origins,
            destinations: &destinations,
            start_time: Time::from_hms(6, 0, 0),
            date: "2025-01-10",
            train_types: None,
        };
        let journeys = search_journeys(&snapshot, &req, 10);
        assert_eq!(journeys.len(), 1);
        let j = &journeys[0];
        assert_eq!(j.departure, Time::from_hms(7, 0, 0));
        assert_eq!(j.arrival, Time::from_hms(9, 0, 0));
        assert_eq!(j.duration, Duration::minutes(120));
        assert_eq!(j.transfers, 0);
        assert_eq!(j.train_types, [TrainType::Inoui].into_iter().collect());
    }

    /// Scenario 2: Trenitalia timezone normalization.
    #[test]
    fn scenario_2_trenitalia_timezone_summer_and_winter() {
        let mut tt = Timetable::default();
        tt.stops.insert("TI:MILANO".into(), stop("TI:MILANO", 45.48, 9.2, Operator::Trenitalia));
        tt.stops.insert("TI:PARIS".into(), stop("TI:PARIS", 48.84, 2.37, Operator::Trenitalia));
        tt.routes_info.insert("TI:R1".into(), route("TI:R1", "FR", Operator::Trenitalia));
        tt.route_stops.insert("TI:R1".into(), vec!["TI:MILANO".into(), "TI:PARIS".into()]);
        tt.route_trips.insert(
            "TI:R1".into(),
            vec![Trip {
                id: "TI:T1".into(),
                route_id: "TI:R1".into(),
                service_id: "TI:SVC".into(),
                operator: Operator::Trenitalia,
                train_type: TrainType::Frecciarossa,
                first_departure_time: Time::from_seconds(39_600),
                stop_times: vec![st("TI:MILANO", 39_600, 39_600), st("TI:PARIS", 43_200, 43_200)],
            }],
        );
        let mut cal = CalendarIndex::default();
        cal.add("2025-06-15", "TI:SVC".to_string());
        cal.add("2025-11-15", "TI:SVC".to_string());
        tt.calendar_index = cal;
        let snapshot = TimetableSnapshot::new(tt);
        let origins = vec!["TI:MILANO".to_string()];
        let destinations = vec!["TI:PARIS".to_string()];

        let summer_req = SearchRequest {
            origins: &origins,
            destinations: &destinations,
            start_time: Time::from_hms(12, 0, 0),
            date: "2025-06-15",
            train_types: None,
        };
        let summer = search_journeys(&snapshot, &summer_req, 10);
        assert_eq!(summer.len(), 1);
        assert_eq!(summer[0].departure, Time::from_hms(13, 0, 0));

        let winter_req = SearchRequest {
            date: "2025-11-15",
            ..summer_req
        };
        let winter = search_journeys(&snapshot, &winter_req, 10);
        assert_eq!(winter.len(), 1);
        assert_eq!(winter[0].departure, Time::from_hms(12, 0, 0));
    }

    /// Scenario 3: transfer category boarding window.
    #[test]
    fn scenario_3_transfer_category_boarding_window() {
        let mut tt = Timetable::default();
        for id in ["SNCF:A", "SNCF:B", "SNCF:C", "SNCF:X", "SNCF:Y"] {
            tt.stops.insert(id.into(), stop(id, 0.0, 0.0, Operator::Sncf));
        }
        tt.routes_info.insert("SNCF:RB".into(), route("SNCF:RB", "RB", Operator::Sncf));
        tt.routes_info.insert("SNCF:RC".into(), route("SNCF:RC", "RC", Operator::Sncf));
        tt.route_stops.insert("SNCF:RB".into(), vec!["SNCF:B".into(), "SNCF:X".into()]);
        tt.route_stops.insert("SNCF:RC".into(), vec!["SNCF:C".into(), "SNCF:Y".into()]);
        tt.route_trips.insert(
            "SNCF:RB".into(),
            vec![Trip {
                id: "SNCF:TB".into(),
                route_id: "SNCF:RB".into(),
                service_id: "SNCF:SVC".into(),
                operator: Operator::Sncf,
                train_type: TrainType::Ter,
                first_departure_time: Time::from_hms(8, 2, 0),
                stop_times: vec![st("SNCF:B", 28_920, 28_920), st("SNCF:X", 30_000, 30_000)],
            }],
        );
        tt.route_trips.insert(
            "SNCF:RC".into(),
            vec![Trip {
                id: "SNCF:TC".into(),
                route_id: "SNCF:RC".into(),
                service_id: "SNCF:SVC".into(),
                operator: Operator::Sncf,
                train_type: TrainType::Ter,
                first_departure_time: Time::from_hms(8, 44, 0),
                stop_times: vec![st("SNCF:C", 31_440, 31_440), st("SNCF:Y", 33_000, 33_000)],
            }],
        );
        let mut transfers = TransferIndex::default();
        transfers.add(
            "SNCF:A".into(),
            TransferLink {
                sibling: "SNCF:B".into(),
                category: TransferCategory::SameStationSameOperator,
            },
        );
        transfers.add(
            "SNCF:A".into(),
            TransferLink {
                sibling: "SNCF:C".into(),
                category: TransferCategory::InterCitySameMetro,
            },
        );
        tt.transfer_index = transfers;
        let mut cal = CalendarIndex::default();
        cal.add("2025-01-10", "SNCF:SVC".to_string());
        tt.calendar_index = cal;
        tt.station_index = StationIndex::default();

        let snapshot = TimetableSnapshot::new(tt);
        let origins = vec!["SNCF:A".to_string()];

        let late_req = SearchRequest {
            origins: &origins,
            destinations: &["SNCF:X".to_string(), "SNCF:Y".to_string()],
            start_time: Time::from_hms(8, 0, 0),
            date: "2025-01-10",
            train_types: None,
        };
        let late = search_journeys(&snapshot, &late_req, 10);
        assert!(late.is_empty(), "neither trip should be boardable from an 08:00 start");

        let early_req = SearchRequest {
            start_time: Time::from_hms(7, 0, 0),
            ..late_req
        };
        let early = search_journeys(&snapshot, &early_req, 10);
        assert_eq!(early.len(), 2, "both trips should be boardable from a 07:00 start");
    }

    #[test]
    fn scenario_6_pareto_ordering() {
        // Exercise the sort directly: journey construction details are
        // covered by the other scenarios, this test only checks ordering.
        fn journey(transfers: usize, duration_mins: i32, dep_hms: (u32, u32, u32)) -> Journey {
            let dep = Time::from_hms(dep_hms.0, dep_hms.1, dep_hms.2);
            Journey {
                legs: vec![Leg {
                    from: "A".into(),
                    to: "B".into(),
                    dep,
                    arr: dep + Duration::minutes(duration_mins),
                    trip_id: "T".into(),
                    route_id: "R".into(),
                    operator: Operator::Sncf,
                    train_type: TrainType::Ter,
                    route_name: "R".into(),
                    duration: Duration::minutes(duration_mins),
                }],
                departure: dep,
                arrival: dep + Duration::minutes(duration_mins),
                duration: Duration::minutes(duration_mins),
                transfers,
                train_types: [TrainType::Ter].into_iter().collect(),
            }
        }
        let mut journeys = vec![
            journey(1, 120, (7, 0, 0)),
            journey(0, 150, (7, 5, 0)),
            journey(1, 115, (8, 0, 0)),
        ];
        journeys.sort_by(|a, b| {
            a.transfers
                .cmp(&b.transfers)
                .then_with(|| a.duration.cmp(&b.duration))
                .then_with(|| a.departure.cmp(&b.departure))
        });
        let shape: Vec<(usize, i32)> = journeys.iter().map(|j| (j.transfers, j.duration.to_mins())).collect();
        assert_eq!(shape, vec![(0, 150), (1, 115), (1, 120)]);
    }
}
