//! The curated station manifest: an offline, hand-maintained CSV mapping
//! operator stop identifiers onto logical stations. Built from an
//! open-data operator-mapping source, but read here as a flat table.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::ManifestError;

#[derive(Debug, Deserialize)]
struct ManifestRow {
    station_key: String,
    stop_id: String,
    display_name: String,
    city: String,
    country: String,
    lat: f64,
    lon: f64,
}

#[derive(Debug, Clone)]
pub struct ManifestStation {
    pub key: String,
    pub display_name: String,
    pub city: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    pub stop_ids: Vec<String>,
}

fn group_rows(rows: impl Iterator<Item = csv::Result<ManifestRow>>) -> Vec<ManifestStation> {
    let mut order: Vec<String> = Vec::new();
    let mut by_key: HashMap<String, ManifestStation> = HashMap::new();
    for result in rows {
        let row = match result {
            Ok(row) => row,
            Err(err) => {
                log::warn!("station manifest: skipping malformed row: {err}");
                continue;
            }
        };
        by_key
            .entry(row.station_key.clone())
            .or_insert_with(|| {
                order.push(row.station_key.clone());
                ManifestStation {
                    key: row.station_key.clone(),
                    display_name: row.display_name.clone(),
                    city: row.city.clone(),
                    country: row.country.clone(),
                    lat: row.lat,
                    lon: row.lon,
                    stop_ids: Vec::new(),
                }
            })
            .stop_ids
            .push(row.stop_id);
    }
    order.into_iter().filter_map(|key| by_key.remove(&key)).collect()
}

/// Load the manifest and group its rows by `station_key`. Display name,
/// city, country, lat/lon are taken from the first row seen for a key;
/// later rows for the same key only contribute their `stop_id`.
pub fn load(path: &Path) -> Result<Vec<ManifestStation>, ManifestError> {
    if !path.exists() {
        return Err(ManifestError::MissingFile(path.to_path_buf()));
    }
    let mut reader = csv::ReaderBuilder::new()
        .from_path(path)
        .map_err(|source| ManifestError::Csv { path: path.to_path_buf(), source })?;
    Ok(group_rows(reader.deserialize()))
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(csv_text: &str) -> Vec<ManifestStation> {
        let mut reader = csv::ReaderBuilder::new().from_reader(csv_text.as_bytes());
        group_rows(reader.deserialize())
    }

    #[test]
    fn groups_rows_by_station_key() {
        let stations = parse(
            "station_key,stop_id,display_name,city,country,lat,lon\n\
             paris-nord,SNCF:87271007,Paris Nord,Paris,FR,48.88,2.35\n\
             paris-nord,ES:paris_nord_3,Paris Nord,Paris,FR,48.88,2.35\n",
        );
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].stop_ids.len(), 2);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load(Path::new("/no/such/manifest.csv")).is_err());
    }
}
