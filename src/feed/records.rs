//! Row shapes of the per-operator schedule files, deserialized directly by
//! `csv`'s serde integration. Kept close to the raw feed column names
//! (mirroring the teacher's `gtfs::model` structs), prefixing onto
//! operator-qualified ids happens one layer up in `feed::reader`.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct RawStop {
    pub stop_id: String,
    pub stop_name: String,
    pub stop_lat: f64,
    pub stop_lon: f64,
}

#[derive(Debug, Deserialize)]
pub struct RawRoute {
    pub route_id: String,
    pub route_short_name: String,
    #[serde(default)]
    pub route_long_name: String,
    pub route_type: String,
}

#[derive(Debug, Deserialize)]
pub struct RawTrip {
    pub route_id: String,
    pub service_id: String,
    pub trip_id: String,
}

#[derive(Debug, Deserialize)]
pub struct RawStopTime {
    pub trip_id: String,
    pub arrival_time: String,
    pub departure_time: String,
    pub stop_id: String,
    pub stop_sequence: u32,
}

#[derive(Debug, Deserialize)]
pub struct RawCalendar {
    pub service_id: String,
    pub monday: u8,
    pub tuesday: u8,
    pub wednesday: u8,
    pub thursday: u8,
    pub friday: u8,
    pub saturday: u8,
    pub sunday: u8,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Deserialize)]
pub struct RawCalendarDate {
    pub service_id: String,
    pub date: String,
    /// 1 = service added, 2 = service removed
    pub exception_type: u8,
}
