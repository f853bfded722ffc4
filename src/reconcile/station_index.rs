//! Builds the station index: groups of stop identifiers that constitute
//! one logical station, partitioning the stop universe almost completely.
//! Leftover ("orphan") stops are folded in by name or promoted to their own
//! singleton station.

use std::collections::{HashMap, HashSet};

use raptor_core::ids::operator_prefix;
use raptor_core::model::{Operator, Stop};
use raptor_core::station::{Station, StationIndex};
use raptor_core::transfer::TransferIndex;

use super::manifest::ManifestStation;
use super::transfer_index::normalize_name;

/// Known bad geographic/name folds that must never be merged, e.g. a
/// Paris-Est stop folding into the unrelated paris_nord orphan group.
const BLACKLIST: &[(&str, &str)] = &[("SNCF:87113001", "ES:paris_nord_3")];

/// First two digits of a UIC-style numeric stop code map to a country.
/// `None` for ids that carry no recognisable numeric UIC prefix.
fn country_from_uic(raw_id: &str) -> Option<&'static str> {
    let digits: String = raw_id.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.len() < 2 {
        return None;
    }
    match &digits[0..2] {
        "87" | "86" => Some("FR"),
        "88" => Some("BE"),
        "80" | "81" => Some("DE"),
        "82" => Some("AT"),
        "83" => Some("IT"),
        "84" => Some("ES"),
        "85" => Some("PT"),
        "71" => Some("ES"),
        "70" => Some("GB"),
        "74" => Some("CH"),
        "79" | "78" => Some("NL"),
        "55" => Some("PL"),
        "54" => Some("CZ"),
        "53" => Some("SK"),
        _ => None,
    }
}

/// Eurostar ids are non-numeric slugs (`paris_nord_3`, `london_st_pancras`);
/// infer a country from well-known place tokens in the slug.
fn country_from_eurostar_slug(raw_id: &str) -> Option<&'static str> {
    let slug = raw_id.to_lowercase();
    if slug.contains("paris") || slug.contains("lille") || slug.contains("marne") || slug.contains("calais") {
        Some("FR")
    } else if slug.contains("london") || slug.contains("ebbsfleet") || slug.contains("ashford") {
        Some("GB")
    } else if slug.contains("bruxelles") || slug.contains("brussels") {
        Some("BE")
    } else if slug.contains("amsterdam") || slug.contains("rotterdam") {
        Some("NL")
    } else {
        None
    }
}

fn infer_country(stop_id: &str) -> String {
    let prefix = operator_prefix(stop_id);
    let operator = Operator::from_prefix(prefix);
    let raw = stop_id.strip_prefix(prefix).and_then(|s| s.strip_prefix(':')).unwrap_or(stop_id);
    if matches!(operator, Operator::Renfe | Operator::OuigoEs) {
        return "ES".to_string();
    }
    if operator == Operator::Eurostar {
        if let Some(country) = country_from_eurostar_slug(raw) {
            return country.to_string();
        }
    }
    country_from_uic(raw).unwrap_or("").to_string()
}

fn is_blacklisted(a: &str, b: &str) -> bool {
    BLACKLIST.iter().any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
}

fn dedup_operators(operators: impl Iterator<Item = Operator>) -> Vec<Operator> {
    let mut ops: Vec<Operator> = operators.collect::<HashSet<_>>().into_iter().collect();
    ops.sort();
    ops
}

fn uic_code(stop_id: &str) -> Option<String> {
    let prefix = operator_prefix(stop_id);
    let raw = stop_id.strip_prefix(prefix).and_then(|s| s.strip_prefix(':')).unwrap_or(stop_id);
    let digits: String = raw.chars().take_while(|c| c.is_ascii_digit()).collect();
    (digits.len() >= 7).then_some(digits)
}

/// Build the station index from the curated manifest plus whatever stops
/// the manifest didn't cover. Manifest stations are the primary pass;
/// unassigned stops are folded into an existing station sharing their
/// normalized name, or promoted to a new singleton station.
pub fn build(stops: &HashMap<String, Stop>, manifest_stations: &[ManifestStation], transfers: &TransferIndex) -> StationIndex {
    let mut stations: Vec<Station> = manifest_stations
        .iter()
        .map(|m| Station {
            display_name: m.display_name.clone(),
            city: m.city.clone(),
            country: m.country.clone(),
            member_stop_ids: m.stop_ids.clone(),
            operators: dedup_operators(m.stop_ids.iter().map(|id| Operator::from_prefix(operator_prefix(id)))),
            lat: m.lat,
            lon: m.lon,
        })
        .collect();

    let assigned: HashSet<&str> = stations.iter().flat_map(|s| s.member_stop_ids.iter().map(String::as_str)).collect();

    let mut by_normalized_name: HashMap<String, usize> = HashMap::new();
    for (idx, station) in stations.iter().enumerate() {
        by_normalized_name.entry(normalize_name(&station.display_name)).or_insert(idx);
    }

    let mut orphan_ids: Vec<&String> = stops.keys().filter(|id| !assigned.contains(id.as_str())).collect();
    orphan_ids.sort();

    for stop_id in orphan_ids {
        let stop = &stops[stop_id];
        let key = normalize_name(&stop.name);
        let fold_target = by_normalized_name.get(&key).copied().filter(|&idx| {
            !stations[idx].member_stop_ids.iter().any(|member| is_blacklisted(member, stop_id))
        });
        match fold_target {
            Some(idx) => {
                stations[idx].member_stop_ids.push(stop_id.clone());
                if !stations[idx].operators.contains(&stop.operator) {
                    stations[idx].operators.push(stop.operator);
                }
            }
            None => {
                let new_idx = stations.len();
                stations.push(Station {
                    display_name: stop.name.clone(),
                    city: stop.name.clone(),
                    country: infer_country(stop_id),
                    member_stop_ids: vec![stop_id.clone()],
                    operators: vec![stop.operator],
                    lat: stop.lat,
                    lon: stop.lon,
                });
                by_normalized_name.entry(key).or_insert(new_idx);
            }
        }
    }

    fuse_sncf_and_eurostar_duplicates(&mut stations, transfers);

    let mut index = StationIndex { stations };
    index.sort_canonically();
    index
}

/// Whether `a` and `b` are linked in either direction in the transfer
/// index, and the pair is not blacklisted — the "whitelist derived from the
/// feed's own transfer table excluding the blacklist" the fuse pass must
/// consult before merging two same-UIC stations.
fn whitelisted_pair(transfers: &TransferIndex, a: &str, b: &str) -> bool {
    if is_blacklisted(a, b) {
        return false;
    }
    transfers.neighbours(a).iter().any(|link| link.sibling == b) || transfers.neighbours(b).iter().any(|link| link.sibling == a)
}

/// When a station known only by SNCF identifiers and a separate station
/// known only by Eurostar identifiers share a UIC code, fuse them and drop
/// the Eurostar-only duplicate — but only when the feed's own transfer
/// table actually links a member of one to a member of the other, and the
/// pair isn't blacklisted.
fn fuse_sncf_and_eurostar_duplicates(stations: &mut Vec<Station>, transfers: &TransferIndex) {
    let mut sncf_by_uic: HashMap<String, usize> = HashMap::new();
    for (idx, station) in stations.iter().enumerate() {
        if station.operators == [Operator::Sncf] {
            if let Some(code) = station.member_stop_ids.iter().find_map(|id| uic_code(id)) {
                sncf_by_uic.insert(code, idx);
            }
        }
    }

    let mut merges: Vec<(usize, usize)> = Vec::new();
    let mut to_drop: HashSet<usize> = HashSet::new();
    for (idx, station) in stations.iter().enumerate() {
        if station.operators != [Operator::Eurostar] {
            continue;
        }
        let Some(code) = station.member_stop_ids.iter().find_map(|id| uic_code(id)) else {
            continue;
        };
        let Some(&target_idx) = sncf_by_uic.get(&code) else {
            continue;
        };
        let linked = station
            .member_stop_ids
            .iter()
            .any(|es_id| stations[target_idx].member_stop_ids.iter().any(|sncf_id| whitelisted_pair(transfers, es_id, sncf_id)));
        if linked {
            merges.push((target_idx, idx));
            to_drop.insert(idx);
        }
    }

    if to_drop.is_empty() {
        return;
    }
    for (target, dup) in &merges {
        let (dup_members, dup_operators) = (stations[*dup].member_stop_ids.clone(), stations[*dup].operators.clone());
        stations[*target].member_stop_ids.extend(dup_members);
        for op in dup_operators {
            if !stations[*target].operators.contains(&op) {
                stations[*target].operators.push(op);
            }
        }
    }
    let mut kept: Vec<Station> = Vec::new();
    for (idx, station) in stations.drain(..).enumerate() {
        if !to_drop.contains(&idx) {
            kept.push(station);
        }
    }
    *stations = kept;
}
