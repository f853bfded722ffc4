use raptor_core::model::Operator;

use crate::persist::TariffRow;
use crate::query::QueryEngine;

/// Everything a request handler needs, built once at startup and shared
/// behind an `Arc` across the tokio runtime's worker threads.
pub struct AppState {
    pub engine: QueryEngine,
    pub tariffs: Vec<TariffRow>,
    pub operators: Vec<Operator>,
}
