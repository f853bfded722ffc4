//! Crate-level integration tests exercising the concrete scenarios and
//! testable properties against in-memory fixtures built with the
//! `Timetable`/`TransferIndex`/`StationIndex` builder APIs, rather than real
//! feed files. The teacher has no `tests/` directory of its own; this
//! follows the sibling pack repos' convention of an integration-test crate
//! wrapped around a lib.

use std::collections::HashSet;

use raptor_core::model::{CalendarIndex, Operator, Route, Stop, StopTime, TrainType, Trip};
use raptor_core::raptor::{search_journeys, SearchRequest};
use raptor_core::snapshot::TimetableSnapshot;
use raptor_core::station::{Station, StationIndex};
use raptor_core::time::{Duration, Time};
use raptor_core::timetable::Timetable;

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

fn trip(id: &str, route_id: &str, service: &str, op: Operator, tt: TrainType, stops: Vec<StopTime>) -> Trip {
    Trip {
        id: id.to_string(),
        route_id: route_id.to_string(),
        service_id: service.to_string(),
        operator: op,
        train_type: tt,
        first_departure_time: stops[0].departure_time,
        stop_times: stops,
    }
}

/// Scenario 5: two journeys departing Paris at 07:00 arrive at different
/// stops of the same Lyon/FR station group; only the faster one survives.
#[test]
fn scenario_5_city_dedup_keeps_faster_arrival() {
    let mut tt = Timetable::default();
    for id in ["SNCF:PARIS", "SNCF:LYON_PD", "SNCF:LYON_PERRACHE"] {
        tt.stops.insert(id.into(), stop(id, 0.0, 0.0, Operator::Sncf));
    }
    tt.routes_info.insert("SNCF:R_PD".into(), route("SNCF:R_PD", "PD", Operator::Sncf));
    tt.routes_info.insert("SNCF:R_PERR".into(), route("SNCF:R_PERR", "PERR", Operator::Sncf));
    tt.route_stops.insert("SNCF:R_PD".into(), vec!["SNCF:PARIS".into(), "SNCF:LYON_PD".into()]);
    tt.route_stops.insert("SNCF:R_PERR".into(), vec!["SNCF:PARIS".into(), "SNCF:LYON_PERRACHE".into()]);
    tt.route_trips.insert(
        "SNCF:R_PD".into(),
        vec![trip(
            "SNCF:T_PD",
            "SNCF:R_PD",
            "SNCF:SVC",
            Operator::Sncf,
            TrainType::Inoui,
            vec![st("SNCF:PARIS", 25_200, 25_200), st("SNCF:LYON_PD", 32_400, 32_400)],
        )],
    );
    tt.route_trips.insert(
        "SNCF:R_PERR".into(),
        vec![trip(
            "SNCF:T_PERR",
            "SNCF:R_PERR",
            "SNCF:SVC",
            Operator::Sncf,
            TrainType::Inoui,
            vec![st("SNCF:PARIS", 25_200, 25_200), st("SNCF:LYON_PERRACHE", 32_700, 32_700)],
        )],
    );
    let mut cal = CalendarIndex::default();
    cal.add("2025-01-10", "SNCF:SVC".to_string());
    tt.calendar_index = cal;
    tt.station_index = StationIndex {
        stations: vec![
            Station {
                display_name: "Paris".into(),
                city: "Paris".into(),
                country: "FR".into(),
                member_stop_ids: vec!["SNCF:PARIS".into()],
                operators: vec![Operator::Sncf],
                lat: 0.0,
                lon: 0.0,
            },
            Station {
                display_name: "Lyon Part-Dieu".into(),
                city: "Lyon".into(),
                country: "FR".into(),
                member_stop_ids: vec!["SNCF:LYON_PD".into()],
                operators: vec![Operator::Sncf],
                lat: 0.0,
                lon: 0.0,
            },
            Station {
                display_name: "Lyon Perrache".into(),
                city: "Lyon".into(),
                country: "FR".into(),
                member_stop_ids: vec!["SNCF:LYON_PERRACHE".into()],
                operators: vec![Operator::Sncf],
                lat: 0.0,
                lon: 0.0,
            },
        ],
    };

    let snapshot = TimetableSnapshot::new(tt);
    let origins = vec!["SNCF:PARIS".to_string()];
    let destinations = vec!["SNCF:LYON_PD".to_string(), "SNCF:LYON_PERRACHE".to_string()];
    let req = SearchRequest {
        origins: &origins,
        destinations: &destinations,
        start_time: Time::from_hms(6, 0, 0),
        date: "2025-01-10",
        train_types: None,
    };
    let journeys = search_journeys(&snapshot, &req, 10);

    assert_eq!(journeys.len(), 1, "only the faster Lyon arrival should survive city dedup");
    assert_eq!(journeys[0].legs.last().unwrap().to, "SNCF:LYON_PD");
    assert_eq!(journeys[0].duration, Duration::minutes(120));
}

/// Filter soundness: a train_types allow-set of {TER} must exclude a faster
/// INOUI-only journey and keep only the TER one, even though the TER
/// journey has more transfers.
#[test]
fn filter_soundness_keeps_only_allowed_train_types() {
    let mut tt = Timetable::default();
    for id in ["SNCF:A", "SNCF:B"] {
        tt.stops.insert(id.into(), stop(id, 0.0, 0.0, Operator::Sncf));
    }
    tt.routes_info.insert("SNCF:FAST".into(), route("SNCF:FAST", "FAST", Operator::Sncf));
    tt.routes_info.insert("SNCF:SLOW".into(), route("SNCF:SLOW", "SLOW", Operator::Sncf));
    tt.route_stops.insert("SNCF:FAST".into(), vec!["SNCF:A".into(), "SNCF:B".into()]);
    tt.route_stops.insert("SNCF:SLOW".into(), vec!["SNCF:A".into(), "SNCF:B".into()]);
    tt.route_trips.insert(
        "SNCF:FAST".into(),
        vec![trip(
            "SNCF:T_FAST",
            "SNCF:FAST",
            "SNCF:SVC",
            Operator::Sncf,
            TrainType::Inoui,
            vec![st("SNCF:A", 25_200, 25_200), st("SNCF:B", 28_800, 28_800)],
        )],
    );
    tt.route_trips.insert(
        "SNCF:SLOW".into(),
        vec![trip(
            "SNCF:T_SLOW",
            "SNCF:SLOW",
            "SNCF:SVC",
            Operator::Sncf,
            TrainType::Ter,
            vec![st("SNCF:A", 25_800, 25_800), st("SNCF:B", 30_600, 30_600)],
        )],
    );
    let mut cal = CalendarIndex::default();
    cal.add("2025-01-10", "SNCF:SVC".to_string());
    tt.calendar_index = cal;

    let snapshot = TimetableSnapshot::new(tt);
    let origins = vec!["SNCF:A".to_string()];
    let destinations = vec!["SNCF:B".to_string()];
    let allow: HashSet<TrainType> = [TrainType::Ter].into_iter().collect();
    let req = SearchRequest {
        origins: &origins,
        destinations: &destinations,
        start_time: Time::from_hms(6, 0, 0),
        date: "2025-01-10",
        train_types: Some(&allow),
    };
    let journeys = search_journeys(&snapshot, &req, 10);

    assert!(journeys.iter().all(|j| j.train_types.iter().all(|t| allow.contains(t))));
    assert!(
        journeys.iter().any(|j| j.train_types.contains(&TrainType::Ter)),
        "the TER journey should still be returned"
    );
    assert!(
        !journeys.iter().any(|j| j.train_types.contains(&TrainType::Inoui)),
        "the INOUI-only journey must be filtered out"
    );
}

/// Monotonicity: departing later never yields an earlier arrival at the
/// same destination on the same date.
#[test]
fn monotonicity_later_start_never_arrives_earlier() {
    let mut tt = Timetable::default();
    for id in ["SNCF:A", "SNCF:B"] {
        tt.stops.insert(id.into(), stop(id, 0.0, 0.0, Operator::Sncf));
    }
    tt.routes_info.insert("SNCF:R1".into(), route("SNCF:R1", "R1", Operator::Sncf));
    tt.route_stops.insert("SNCF:R1".into(), vec!["SNCF:A".into(), "SNCF:B".into()]);
    tt.route_trips.insert(
        "SNCF:R1".into(),
        vec![
            trip(
                "SNCF:T1",
                "SNCF:R1",
                "SNCF:SVC",
                Operator::Sncf,
                TrainType::Ter,
                vec![st("SNCF:A", 25_200, 25_200), st("SNCF:B", 28_800, 28_800)],
            ),
            trip(
                "SNCF:T2",
                "SNCF:R1",
                "SNCF:SVC",
                Operator::Sncf,
                TrainType::Ter,
                vec![st("SNCF:A", 32_400, 32_400), st("SNCF:B", 36_000, 36_000)],
            ),
        ],
    );
    let mut cal = CalendarIndex::default();
    cal.add("2025-01-10", "SNCF:SVC".to_string());
    tt.calendar_index = cal;

    let snapshot = TimetableSnapshot::new(tt);
    let origins = vec!["SNCF:A".to_string()];
    let destinations = vec!["SNCF:B".to_string()];

    let earlier = search_journeys(
        &snapshot,
        &SearchRequest {
            origins: &origins,
            destinations: &destinations,
            start_time: Time::from_hms(6, 0, 0),
            date: "2025-01-10",
            train_types: None,
        },
        1,
    );
    let later = search_journeys(
        &snapshot,
        &SearchRequest {
            origins: &origins,
            destinations: &destinations,
            start_time: Time::from_hms(7, 30, 0),
            date: "2025-01-10",
            train_types: None,
        },
        1,
    );

    assert_eq!(earlier[0].arrival, Time::from_hms(8, 0, 0));
    assert_eq!(later[0].arrival, Time::from_hms(10, 0, 0));
    assert!(later[0].arrival >= earlier[0].arrival);
}

/// Invariant check wired end-to-end: a hand-built multi-operator timetable
/// with consistent route/stop cross-references passes `Timetable::validate`.
#[test]
fn validate_passes_for_multi_operator_timetable() {
    let mut tt = Timetable::default();
    tt.stops.insert("SNCF:A".into(), stop("SNCF:A", 0.0, 0.0, Operator::Sncf));
    tt.stops.insert("TI:B".into(), stop("TI:B", 0.0, 0.0, Operator::Trenitalia));
    tt.routes_info.insert("SNCF:R1".into(), route("SNCF:R1", "R1", Operator::Sncf));
    tt.route_stops.insert("SNCF:R1".into(), vec!["SNCF:A".into()]);
    tt.routes_by_stop.entry("SNCF:A".into()).or_default().insert("SNCF:R1".into());
    tt.route_trips.insert(
        "SNCF:R1".into(),
        vec![trip(
            "SNCF:T1",
            "SNCF:R1",
            "SNCF:SVC",
            Operator::Sncf,
            TrainType::Inoui,
            vec![st("SNCF:A", 0, 0)],
        )],
    );
    assert!(tt.validate().is_empty(), "{:?}", tt.validate());
}
