use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ids::StopId;
use crate::model::Operator;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub display_name: String,
    pub city: String,
    pub country: String,
    pub member_stop_ids: Vec<StopId>,
    pub operators: Vec<Operator>,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StationIndex {
    pub stations: Vec<Station>,
}

impl StationIndex {
    /// Map from stop id to the index of its station in `stations`.
    pub fn stop_to_station(&self) -> HashMap<StopId, usize> {
        let mut map = HashMap::new();
        for (idx, station) in self.stations.iter().enumerate() {
            for stop in &station.member_stop_ids {
                map.insert(stop.clone(), idx);
            }
        }
        map
    }

    pub fn station_of<'a>(&'a self, stop_to_station: &HashMap<StopId, usize>, stop: &str) -> Option<&'a Station> {
        stop_to_station.get(stop).map(|&idx| &self.stations[idx])
    }

    /// Sort stations by operator-presence score (best-represented operator
    /// first), then by display name, as the reconciler's final pass does.
    pub fn sort_canonically(&mut self) {
        self.stations.sort_by(|a, b| {
            let rank_a = a.operators.iter().map(|o| o.presence_rank()).min().unwrap_or(255);
            let rank_b = b.operators.iter().map(|o| o.presence_rank()).min().unwrap_or(255);
            rank_a.cmp(&rank_b).then_with(|| a.display_name.cmp(&b.display_name))
        });
    }

    /// Stations sharing a `(city, country)` key with at least 2 members form
    /// one city group, exposed for "search from city" queries.
    pub fn city_groups(&self) -> Vec<CityGroup> {
        let mut by_key: HashMap<(String, String), Vec<usize>> = HashMap::new();
        for (idx, station) in self.stations.iter().enumerate() {
            by_key
                .entry((station.city.clone(), station.country.clone()))
                .or_default()
                .push(idx);
        }
        by_key
            .into_iter()
            .filter(|(_, stations)| stations.len() >= 2)
            .map(|((city, country), station_indices)| CityGroup {
                city,
                country,
                station_indices,
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct CityGroup {
    pub city: String,
    pub country: String,
    pub station_indices: Vec<usize>,
}
