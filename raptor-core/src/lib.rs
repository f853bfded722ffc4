//! Reusable data model, indexes and round-based search engine for a
//! multi-operator rail timetable. Built once (by the feed reader, timetable
//! builder and station reconciler in the root crate) into a `Timetable`,
//! wrapped in a `TimetableSnapshot`, then queried many times by the HTTP
//! service through `raptor::search_journeys` / `raptor::explore`.

pub mod ids;
pub mod model;
pub mod raptor;
pub mod snapshot;
pub mod station;
pub mod time;
pub mod timetable;
pub mod transfer;

pub use ids::{RouteId, ServiceId, StopId, TripId};
pub use model::{CalendarIndex, Operator, Route, Stop, StopTime, TrainType, Trip};
pub use raptor::{explore, search_journeys, Journey, Leg, ParentEntry, SearchRequest, SearchState};
pub use snapshot::TimetableSnapshot;
pub use station::{CityGroup, Station, StationIndex};
pub use time::{Duration, Period, Time};
pub use timetable::{StopToTrips, Timetable, TripStopRef};
pub use transfer::{TransferCategory, TransferIndex, TransferLink};
