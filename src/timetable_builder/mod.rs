//! Turns the per-operator parsed feeds into one merged `Timetable`: repairs
//! non-monotonic trips, expands calendars, classifies train types, and
//! builds the route-shaped indexes round-based search runs over directly.

pub mod builder;
pub mod calendar;
pub mod repair;
pub mod route_index;
pub mod trainclass;

pub use builder::build;
