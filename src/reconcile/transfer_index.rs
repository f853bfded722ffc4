//! Builds the transfer index: for every stop, the sibling stops reachable
//! by walking, each tagged with the category that sets its minimum dwell.
//! Four passes run in order, each able to override what the previous pass
//! decided: geographic pairing, manifest enrichment, cross-operator name
//! linking, then inter-city linking.

use std::collections::HashMap;

use geo::HaversineDistance;
use regex::Regex;

use raptor_core::ids::operator_prefix;
use raptor_core::model::{Operator, Stop};
use raptor_core::transfer::{TransferCategory, TransferIndex};

use super::manifest::ManifestStation;

/// Stops within this distance of each other are presumed walkable absent
/// better information. Experimentally chosen, not derived from any feed.
const GEOGRAPHIC_PAIRING_METERS: f64 = 300.0;

fn category_for(a: &str, b: &str) -> TransferCategory {
    if operator_prefix(a) == operator_prefix(b) {
        TransferCategory::SameStationSameOperator
    } else {
        TransferCategory::SameStationCrossOperator
    }
}

/// Lowercase, strip accents, collapse non-alphanumerics to single spaces —
/// used to link a TI stop to the SNCF stop for the same physical place when
/// the manifest doesn't already cover it.
pub(super) fn normalize_name(name: &str) -> String {
    let folded: String = name
        .chars()
        .map(|c| match c {
            'à' | 'á' | 'â' | 'ä' | 'ã' => 'a',
            'è' | 'é' | 'ê' | 'ë' => 'e',
            'ì' | 'í' | 'î' | 'ï' => 'i',
            'ò' | 'ó' | 'ô' | 'ö' | 'õ' => 'o',
            'ù' | 'ú' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            'ñ' => 'n',
            other => other,
        })
        .collect::<String>()
        .to_lowercase();
    let non_alnum = Regex::new(r"[^a-z0-9]+").unwrap();
    non_alnum.replace_all(&folded, " ").trim().to_string()
}

/// Pass 1: every pair of stops within `GEOGRAPHIC_PAIRING_METERS`, quadratic
/// in stop count — acceptable at the working scale.
fn pair_by_geography(stops: &[&Stop], index: &mut TransferIndex) {
    for (i, a) in stops.iter().enumerate() {
        for b in &stops[i + 1..] {
            let distance = a.point().haversine_distance(&b.point());
            if distance <= GEOGRAPHIC_PAIRING_METERS {
                index.add_symmetric(a.id.clone(), b.id.clone(), category_for(&a.id, &b.id));
            }
        }
    }
}

/// Pass 2: every unordered pair of stop ids named by the same manifest
/// station produces a same-station link, overriding geography.
fn enrich_from_manifest(stations: &[ManifestStation], index: &mut TransferIndex) {
    for station in stations {
        for (i, a) in station.stop_ids.iter().enumerate() {
            for b in &station.stop_ids[i + 1..] {
                index.add_symmetric(a.clone(), b.clone(), category_for(a, b));
            }
        }
    }
}

/// Pass 3: TI stops linked to SNCF stops that share a normalized name.
fn link_by_normalized_name(stops: &[&Stop], index: &mut TransferIndex) {
    let mut sncf_by_name: HashMap<String, Vec<&Stop>> = HashMap::new();
    for stop in stops {
        if stop.operator == Operator::Sncf {
            sncf_by_name.entry(normalize_name(&stop.name)).or_default().push(stop);
        }
    }
    for stop in stops {
        if stop.operator != Operator::Trenitalia {
            continue;
        }
        if let Some(matches) = sncf_by_name.get(&normalize_name(&stop.name)) {
            for sncf_stop in matches {
                index.add_symmetric(stop.id.clone(), sncf_stop.id.clone(), TransferCategory::SameStationCrossOperator);
            }
        }
    }
}

/// Pass 4: stops in different stations but the same `(city, country)` are
/// linked as inter-city-same-metro. `station_of` maps a stop id to its
/// manifest station key; stops sharing a key are already linked by pass 2
/// and are skipped here.
fn link_inter_city(
    stations: &[ManifestStation],
    station_key_of: &HashMap<String, String>,
    index: &mut TransferIndex,
) {
    let mut by_city: HashMap<(String, String), Vec<&ManifestStation>> = HashMap::new();
    for station in stations {
        by_city.entry((station.city.clone(), station.country.clone())).or_default().push(station);
    }
    for group in by_city.values() {
        if group.len() < 2 {
            continue;
        }
        for (i, station_a) in group.iter().enumerate() {
            for station_b in &group[i + 1..] {
                for a in &station_a.stop_ids {
                    for b in &station_b.stop_ids {
                        if station_key_of.get(a) == station_key_of.get(b) {
                            continue;
                        }
                        index.add_symmetric(a.clone(), b.clone(), TransferCategory::InterCitySameMetro);
                    }
                }
            }
        }
    }
}

pub fn build(stops: &HashMap<String, Stop>, stations: &[ManifestStation]) -> TransferIndex {
    let mut index = TransferIndex::default();
    let stop_refs: Vec<&Stop> = stops.values().collect();

    pair_by_geography(&stop_refs, &mut index);
    enrich_from_manifest(stations, &mut index);
    link_by_normalized_name(&stop_refs, &mut index);

    let mut station_key_of: HashMap<String, String> = HashMap::new();
    for station in stations {
        for stop_id in &station.stop_ids {
            station_key_of.insert(stop_id.clone(), station.key.clone());
        }
    }
    link_inter_city(stations, &station_key_of, &mut index);

    index
}

#[cfg(test)]
mod test {
    use super::*;

    fn stop(id: &str, name: &str, lat: f64, lon: f64, operator: Operator) -> Stop {
        Stop {
            id: id.to_string(),
            name: name.to_string(),
            lat,
            lon,
            operator,
        }
    }

    fn manifest_station(key: &str, city: &str, stop_ids: &[&str]) -> ManifestStation {
        ManifestStation {
            key: key.to_string(),
            display_name: key.to_string(),
            city: city.to_string(),
            country: "FR".to_string(),
            lat: 0.0,
            lon: 0.0,
            stop_ids: stop_ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn nearby_stops_get_same_operator_category() {
        let mut stops = HashMap::new();
        stops.insert("SNCF:A".to_string(), stop("SNCF:A", "Gare A", 48.8566, 2.3522, Operator::Sncf));
        stops.insert("SNCF:B".to_string(), stop("SNCF:B", "Gare B", 48.8567, 2.3523, Operator::Sncf));
        let index = build(&stops, &[]);
        let links = index.neighbours("SNCF:A");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].category, TransferCategory::SameStationSameOperator);
    }

    #[test]
    fn manifest_links_are_cross_operator_even_when_far_apart() {
        let mut stops = HashMap::new();
        stops.insert("SNCF:A".to_string(), stop("SNCF:A", "Gare A", 0.0, 0.0, Operator::Sncf));
        stops.insert("ES:A".to_string(), stop("ES:A", "Gare A Eurostar", 10.0, 10.0, Operator::Eurostar));
        let stations = vec![manifest_station("sta", "Paris", &["SNCF:A", "ES:A"])];
        let index = build(&stops, &stations);
        let links = index.neighbours("SNCF:A");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].category, TransferCategory::SameStationCrossOperator);
    }

    #[test]
    fn ti_stop_links_to_sncf_stop_with_same_normalized_name() {
        let mut stops = HashMap::new();
        stops.insert("SNCF:PLM".to_string(), stop("SNCF:PLM", "Paris Gare de Lyon", 10.0, 10.0, Operator::Sncf));
        stops.insert("TI:PLM".to_string(), stop("TI:PLM", "Paris Gare De Lyon", -5.0, -5.0, Operator::Trenitalia));
        let index = build(&stops, &[]);
        assert!(index.neighbours("TI:PLM").iter().any(|l| l.sibling == "SNCF:PLM"));
    }

    #[test]
    fn different_stations_same_city_link_inter_city() {
        let mut stops = HashMap::new();
        stops.insert("SNCF:NORD".to_string(), stop("SNCF:NORD", "Gare du Nord", 0.0, 0.0, Operator::Sncf));
        stops.insert("SNCF:LYON".to_string(), stop("SNCF:LYON", "Gare de Lyon", 50.0, 50.0, Operator::Sncf));
        let stations = vec![
            manifest_station("nord", "Paris", &["SNCF:NORD"]),
            manifest_station("lyon", "Paris", &["SNCF:LYON"]),
        ];
        let index = build(&stops, &stations);
        let links = index.neighbours("SNCF:NORD");
        assert!(links.iter().any(|l| l.category == TransferCategory::InterCitySameMetro));
    }
}
