pub mod config;
pub mod error;
pub mod feed;
pub mod http;
pub mod persist;
pub mod query;
pub mod reconcile;
pub mod suggester;
pub mod timetable_builder;

pub use suggester::Suggester;
