//! Product classification assigned to each trip at ingestion time and
//! stored on the trip, never recomputed per query. Rules are
//! operator-specific and keyed on (a) a product token embedded in the
//! boarding stop-point id, (b) substrings of the trip id (the OUIGO
//! number-range split), and (c) the route short name, in that order of
//! precedence for SNCF, the only operator whose stop-point ids carry a
//! product token at all.

use raptor_core::model::{Operator, TrainType};

/// First contiguous run of ASCII digits anywhere in `s`, used to recover
/// the trip number OUIGO's sub-classification keys on.
fn first_digit_run(s: &str) -> Option<u32> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let digits: String = s[start..].chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// OUIGO trip numbers in the `7xxx` range are the high-speed product,
/// `4xxx` the classic-stock one; anything else defaults to high-speed.
fn classify_ouigo(raw_trip_id: &str) -> TrainType {
    match first_digit_run(raw_trip_id).map(|n| n / 1000) {
        Some(4) => TrainType::OuigoClassique,
        _ => TrainType::Ouigo,
    }
}

/// SNCF stop-point ids are sometimes of the form `StopPoint:OCETGV-87113001`
/// or `StopPoint:OCETER-87713040`, embedding the product directly ahead of
/// the UIC code; this reads that token straight off the boarding stop's raw
/// id, taking precedence over the route short name when present.
fn platform_token(board_stop_id: &str) -> Option<TrainType> {
    let raw = board_stop_id.split(':').next_back().unwrap_or(board_stop_id).to_ascii_uppercase();
    if raw.contains("OUIGO") {
        Some(TrainType::Ouigo)
    } else if raw.contains("TGV") || raw.contains("INOUI") {
        Some(TrainType::Inoui)
    } else if raw.contains("TER") {
        Some(TrainType::Ter)
    } else if raw.contains("ICN") {
        Some(TrainType::IcNuit)
    } else {
        None
    }
}

pub fn classify(operator: Operator, board_stop_id: &str, route_short_name: &str, raw_trip_id: &str) -> TrainType {
    let short = route_short_name.to_ascii_uppercase();
    match operator {
        Operator::Sncf => match platform_token(board_stop_id) {
            Some(TrainType::Ouigo) => classify_ouigo(raw_trip_id),
            Some(token) => token,
            None => match short.as_str() {
                "OUIGO" => classify_ouigo(raw_trip_id),
                "LYRIA" => TrainType::Lyria,
                "TER" => TrainType::Ter,
                "IC" | "INTERCITES" => TrainType::Ic,
                "IC NUIT" | "ICN" | "INTERCITES DE NUIT" => TrainType::IcNuit,
                _ => TrainType::Inoui,
            },
        },
        Operator::Trenitalia => TrainType::Frecciarossa,
        Operator::Eurostar => TrainType::Eurostar,
        Operator::Sncb => match short.as_str() {
            "IC" => TrainType::IcSncb,
            "EC" => TrainType::Ec,
            "NJ" => TrainType::Nightjet,
            "OTC" => TrainType::ThalysCorridor,
            _ => TrainType::Unknown,
        },
        Operator::Db => match short.as_str() {
            "ICE" => TrainType::Ice,
            "IC" => TrainType::IcDb,
            "NJ" => TrainType::Nightjet,
            _ => TrainType::Unknown,
        },
        Operator::Renfe => match short.as_str() {
            "AVE" => TrainType::Ave,
            "ALVIA" => TrainType::Alvia,
            _ => TrainType::Unknown,
        },
        Operator::OuigoEs => TrainType::Ouigo,
        Operator::Other => TrainType::Unknown,
    }
}
