use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::timetable::{StopToTrips, Timetable};

const DATE_CACHE_CAPACITY: usize = 7;

/// The sole mutable structure shared across requests: a small, process-wide
/// cache of date-filtered `stopToTrips` indexes. Guarded by a plain mutex —
/// entries are large (megabytes) and insertion is rare, so lock contention
/// is not a concern at this scale.
struct DateCache {
    order: VecDeque<String>,
    entries: std::collections::HashMap<String, Arc<StopToTrips>>,
}

impl DateCache {
    fn new() -> DateCache {
        DateCache {
            order: VecDeque::new(),
            entries: std::collections::HashMap::new(),
        }
    }

    fn get(&self, date: &str) -> Option<Arc<StopToTrips>> {
        self.entries.get(date).cloned()
    }

    fn insert(&mut self, date: String, value: Arc<StopToTrips>) {
        if self.entries.contains_key(&date) {
            return;
        }
        if self.order.len() >= DATE_CACHE_CAPACITY {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
        self.order.push_back(date.clone());
        self.entries.insert(date, value);
    }
}

/// Owns the immutable timetable plus the one piece of mutable, shared state
/// (the date cache), so the sharing is explicit and testable rather than a
/// bare global.
pub struct TimetableSnapshot {
    pub timetable: Timetable,
    unfiltered_stop_to_trips: StopToTrips,
    date_cache: Mutex<DateCache>,
}

impl TimetableSnapshot {
    pub fn new(timetable: Timetable) -> TimetableSnapshot {
        let unfiltered_stop_to_trips = timetable.build_stop_to_trips();
        TimetableSnapshot {
            timetable,
            unfiltered_stop_to_trips,
            date_cache: Mutex::new(DateCache::new()),
        }
    }

    pub fn unfiltered(&self) -> &StopToTrips {
        &self.unfiltered_stop_to_trips
    }

    /// Fetch (or build and cache) the `stopToTrips` index restricted to the
    /// services active on `date`.
    pub fn stop_to_trips_for_date(&self, date: &str) -> Arc<StopToTrips> {
        {
            let cache = self.date_cache.lock().unwrap();
            if let Some(existing) = cache.get(date) {
                return existing;
            }
        }
        let filtered = Arc::new(
            self.timetable
                .filter_stop_to_trips_for_date(&self.unfiltered_stop_to_trips, date),
        );
        let mut cache = self.date_cache.lock().unwrap();
        cache.insert(date.to_string(), filtered.clone());
        filtered
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::{Operator, Route, StopTime, Trip, TrainType};
    use crate::time::Time;

    fn minimal_timetable(dates: &[&str]) -> Timetable {
        let mut tt = Timetable::default();
        tt.routes_info.insert(
            "SNCF:R".into(),
            Route {
                id: "SNCF:R".into(),
                short_name: "R".into(),
                long_name: "".into(),
                route_type: "rail".into(),
                operator: Operator::Sncf,
            },
        );
        tt.route_trips.insert(
            "SNCF:R".into(),
            vec![Trip {
                id: "SNCF:T".into(),
                route_id: "SNCF:R".into(),
                service_id: "SNCF:S".into(),
                operator: Operator::Sncf,
                train_type: TrainType::Inoui,
                first_departure_time: Time::from_seconds(0),
                stop_times: vec![StopTime {
                    stop_id: "SNCF:A".into(),
                    arrival_time: Time::from_seconds(0),
                    departure_time: Time::from_seconds(0),
                }],
            }],
        );
        for date in dates {
            tt.calendar_index.add(date.to_string(), "SNCF:S".to_string());
        }
        tt
    }

    #[test]
    fn caches_up_to_seven_dates_and_evicts_oldest() {
        let tt = minimal_timetable(&["2025-01-01", "2025-01-02", "2025-01-03", "2025-01-04", "2025-01-05", "2025-01-06", "2025-01-07", "2025-01-08"]);
        let snapshot = TimetableSnapshot::new(tt);
        for d in 1..=8 {
            let date = format!("2025-01-{d:02}");
            snapshot.stop_to_trips_for_date(&date);
        }
        let cache = snapshot.date_cache.lock().unwrap();
        assert_eq!(cache.entries.len(), DATE_CACHE_CAPACITY);
        assert!(!cache.entries.contains_key("2025-01-01"), "oldest entry should have been evicted");
        assert!(cache.entries.contains_key("2025-01-08"));
    }

    #[test]
    fn returns_same_filtered_index_for_repeated_dates() {
        let tt = minimal_timetable(&["2025-01-01"]);
        let snapshot = TimetableSnapshot::new(tt);
        let first = snapshot.stop_to_trips_for_date("2025-01-01");
        let second = snapshot.stop_to_trips_for_date("2025-01-01");
        assert!(Arc::ptr_eq(&first, &second));
    }
}
