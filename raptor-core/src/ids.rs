//! Identifier types. Every identifier that survives ingestion is an owned,
//! operator-prefixed string (`"SNCF:...-87391003"`, `"TI:S01700"`), never a
//! bare per-feed numeric id — the teacher's interned `u64` stop ids only
//! worked because VBB is a single operator's feed; merging several operators
//! means the prefix itself is load-bearing.

pub type StopId = String;
pub type RouteId = String;
pub type TripId = String;
pub type ServiceId = String;

/// Split the operator prefix off an identifier, e.g. `"SNCF:foo"` -> `"SNCF"`.
/// Returns the whole string if there is no `:`.
pub fn operator_prefix(id: &str) -> &str {
    match id.find(':') {
        Some(idx) => &id[..idx],
        None => id,
    }
}

/// Build a prefixed identifier from an operator code and a raw feed id.
pub fn prefixed(operator_code: &str, raw_id: &str) -> String {
    format!("{operator_code}:{raw_id}")
}
