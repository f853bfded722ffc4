use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::ids::{operator_prefix, RouteId, ServiceId, StopId, TripId};
use crate::time::Time;

/// One of the merged feeds. `Other` covers any operator reachable only
/// through its raw prefix, so the planner never has to reject an
/// unrecognised feed outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Operator {
    Sncf,
    Trenitalia,
    Eurostar,
    Sncb,
    Db,
    Renfe,
    OuigoEs,
    Other,
}

impl Operator {
    pub fn code(self) -> &'static str {
        match self {
            Operator::Sncf => "SNCF",
            Operator::Trenitalia => "TI",
            Operator::Eurostar => "ES",
            Operator::Sncb => "SNCB",
            Operator::Db => "DB",
            Operator::Renfe => "RENFE",
            Operator::OuigoEs => "OUIGO_ES",
            Operator::Other => "OTHER",
        }
    }

    pub fn from_prefix(prefix: &str) -> Operator {
        match prefix {
            "SNCF" => Operator::Sncf,
            "TI" => Operator::Trenitalia,
            "ES" => Operator::Eurostar,
            "SNCB" => Operator::Sncb,
            "DB" => Operator::Db,
            "RENFE" => Operator::Renfe,
            "OUIGO_ES" => Operator::OuigoEs,
            _ => Operator::Other,
        }
    }

    pub fn from_stop_id(id: &str) -> Operator {
        Operator::from_prefix(operator_prefix(id))
    }

    /// Ordering used to break ties when sorting stations by operator
    /// presence: SNCF > RENFE > OUIGO_ES > ES > TI > everything else.
    pub fn presence_rank(self) -> u8 {
        match self {
            Operator::Sncf => 0,
            Operator::Renfe => 1,
            Operator::OuigoEs => 2,
            Operator::Eurostar => 3,
            Operator::Trenitalia => 4,
            Operator::Sncb => 5,
            Operator::Db => 5,
            Operator::Other => 6,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Product classification assigned to a trip at ingestion time. Stored on
/// the trip, never recomputed per query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TrainType {
    Inoui,
    Ouigo,
    OuigoClassique,
    Ic,
    IcNuit,
    Lyria,
    Ter,
    Frecciarossa,
    Eurostar,
    Nightjet,
    Ec,
    ThalysCorridor,
    IcSncb,
    Ice,
    IcDb,
    Ave,
    Alvia,
    Unknown,
}

impl fmt::Display for TrainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrainType::Inoui => "INOUI",
            TrainType::Ouigo => "OUIGO",
            TrainType::OuigoClassique => "OUIGO_CLASSIQUE",
            TrainType::Ic => "IC",
            TrainType::IcNuit => "IC_NUIT",
            TrainType::Lyria => "LYRIA",
            TrainType::Ter => "TER",
            TrainType::Frecciarossa => "FRECCIAROSSA",
            TrainType::Eurostar => "EUROSTAR",
            TrainType::Nightjet => "NIGHTJET",
            TrainType::Ec => "EC",
            TrainType::ThalysCorridor => "THALYS_CORRIDOR",
            TrainType::IcSncb => "IC_SNCB",
            TrainType::Ice => "ICE",
            TrainType::IcDb => "IC_DB",
            TrainType::Ave => "AVE",
            TrainType::Alvia => "ALVIA",
            TrainType::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for TrainType {
    type Err = ();

    fn from_str(s: &str) -> Result<TrainType, ()> {
        Ok(match s {
            "INOUI" => TrainType::Inoui,
            "OUIGO" => TrainType::Ouigo,
            "OUIGO_CLASSIQUE" => TrainType::OuigoClassique,
            "IC" => TrainType::Ic,
            "IC_NUIT" => TrainType::IcNuit,
            "LYRIA" => TrainType::Lyria,
            "TER" => TrainType::Ter,
            "FRECCIAROSSA" => TrainType::Frecciarossa,
            "EUROSTAR" => TrainType::Eurostar,
            "NIGHTJET" => TrainType::Nightjet,
            "EC" => TrainType::Ec,
            "THALYS_CORRIDOR" => TrainType::ThalysCorridor,
            "IC_SNCB" => TrainType::IcSncb,
            "ICE" => TrainType::Ice,
            "IC_DB" => TrainType::IcDb,
            "AVE" => TrainType::Ave,
            "ALVIA" => TrainType::Alvia,
            _ => TrainType::Unknown,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stop {
    pub id: StopId,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub operator: Operator,
}

impl Stop {
    pub fn point(&self) -> geo::Point<f64> {
        geo::Point::new(self.lon, self.lat)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub id: RouteId,
    pub short_name: String,
    pub long_name: String,
    pub route_type: String,
    pub operator: Operator,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopTime {
    pub stop_id: StopId,
    pub arrival_time: Time,
    pub departure_time: Time,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: TripId,
    pub route_id: RouteId,
    pub service_id: ServiceId,
    pub operator: Operator,
    pub train_type: TrainType,
    pub first_departure_time: Time,
    pub stop_times: Vec<StopTime>,
}

impl Trip {
    /// Invariant check used by ingestion tests and the offline validator:
    /// a repaired trip must have a non-empty, non-decreasing stop time list.
    pub fn is_well_formed(&self) -> bool {
        if self.stop_times.is_empty() {
            return false;
        }
        self.stop_times
            .windows(2)
            .all(|w| w[0].arrival_time <= w[1].arrival_time && w[0].departure_time <= w[1].departure_time)
    }
}

/// Mapping from ISO date (`YYYY-MM-DD`) to the set of service ids active on
/// that date.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarIndex(pub HashMap<String, HashSet<ServiceId>>);

impl CalendarIndex {
    pub fn active_services(&self, date: &str) -> HashSet<ServiceId> {
        self.0.get(date).cloned().unwrap_or_default()
    }

    pub fn add(&mut self, date: impl Into<String>, service: ServiceId) {
        self.0.entry(date.into()).or_default().insert(service);
    }
}
