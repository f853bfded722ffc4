use std::collections::HashSet;
use std::convert::Infallible;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use warp::http::StatusCode;
use warp::Filter;

use raptor_core::model::TrainType;
use raptor_core::raptor::{explore, search_journeys, SearchRequest};
use raptor_core::time::Time;

use super::state::AppState;

/// A 400 with a one-line JSON message — the one kind of rejection this
/// surface ever produces deliberately, as opposed to warp's own built-in
/// missing-query-parameter rejections, which `handle_rejection` also maps
/// to the same shape.
#[derive(Debug)]
pub struct ApiError(pub String);

impl warp::reject::Reject for ApiError {}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

pub async fn handle_rejection(err: warp::Rejection) -> Result<impl warp::Reply, Infallible> {
    let message = if let Some(ApiError(msg)) = err.find() {
        msg.clone()
    } else if err.is_not_found() {
        "not found".to_string()
    } else {
        "invalid or missing request parameters".to_string()
    };
    Ok(warp::reply::with_status(warp::reply::json(&ErrorBody { error: message }), StatusCode::BAD_REQUEST))
}

pub fn with_data(state: Arc<AppState>) -> impl Filter<Extract = (Arc<AppState>,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn split_ids(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
}

fn resolve_known_stops(state: &AppState, raw: &str) -> Vec<String> {
    split_ids(raw).into_iter().filter(|id| state.engine.snapshot.timetable.stops.contains_key(id)).collect()
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    from: String,
    to: String,
    time: String,
    date: String,
    limit: Option<usize>,
    train_types: Option<String>,
}

const DEFAULT_RESULT_LIMIT: usize = 10;

pub async fn search_handler(params: SearchParams, state: Arc<AppState>) -> Result<impl warp::Reply, warp::Rejection> {
    let origins = resolve_known_stops(&state, &params.from);
    let destinations = resolve_known_stops(&state, &params.to);
    if origins.is_empty() || destinations.is_empty() {
        return Ok(warp::reply::json(&Vec::<raptor_core::raptor::Journey>::new()));
    }
    let start_time: Time = params
        .time
        .parse()
        .map_err(|_| warp::reject::custom(ApiError(format!("invalid time {:?}", params.time))))?;
    let train_types: Option<HashSet<TrainType>> = params
        .train_types
        .as_deref()
        .map(|raw| split_ids(raw).into_iter().filter_map(|s| s.parse().ok()).collect());

    let req = SearchRequest {
        origins: &origins,
        destinations: &destinations,
        start_time,
        date: &params.date,
        train_types: train_types.as_ref(),
    };
    let limit = params.limit.unwrap_or(DEFAULT_RESULT_LIMIT);
    let journeys = search_journeys(&state.engine.snapshot, &req, limit);
    Ok(warp::reply::json(&journeys))
}

#[derive(Debug, Deserialize)]
pub struct ExploreParams {
    from: String,
    date: String,
}

pub async fn explore_handler(params: ExploreParams, state: Arc<AppState>) -> Result<impl warp::Reply, warp::Rejection> {
    let origins = resolve_known_stops(&state, &params.from);
    if origins.is_empty() {
        return Ok(warp::reply::json(&std::collections::HashMap::<String, i32>::new()));
    }
    let reachable = explore(&state.engine.snapshot, &origins, &params.date);
    let seconds: std::collections::HashMap<String, i32> = reachable.into_iter().map(|(stop, duration)| (stop, duration.to_secs())).collect();
    Ok(warp::reply::json(&seconds))
}

#[derive(Debug, Deserialize)]
pub struct AutocompleteParams {
    q: String,
}

const AUTOCOMPLETE_LIMIT: usize = 20;

#[derive(Serialize)]
struct StopSuggestion {
    stop_id: String,
    name: String,
}

pub async fn stops_handler(params: AutocompleteParams, state: Arc<AppState>) -> Result<impl warp::Reply, warp::Rejection> {
    let suggestions: Vec<StopSuggestion> = state
        .engine
        .suggest_stops(&params.q, AUTOCOMPLETE_LIMIT)
        .into_iter()
        .map(|(stop_id, name)| StopSuggestion { stop_id, name })
        .collect();
    Ok(warp::reply::json(&suggestions))
}

pub async fn cities_handler(params: AutocompleteParams, state: Arc<AppState>) -> Result<impl warp::Reply, warp::Rejection> {
    let suggestions = state.engine.suggest_cities(&params.q, AUTOCOMPLETE_LIMIT);
    Ok(warp::reply::json(&suggestions))
}

#[derive(Serialize)]
struct MetaBody<'a> {
    operators: &'a [raptor_core::model::Operator],
    stop_count: usize,
    route_count: usize,
}

pub async fn meta_handler(state: Arc<AppState>) -> Result<impl warp::Reply, warp::Rejection> {
    let timetable = &state.engine.snapshot.timetable;
    Ok(warp::reply::json(&MetaBody {
        operators: &state.operators,
        stop_count: timetable.stops.len(),
        route_count: timetable.routes_info.len(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct DebugTripsParams {
    route: Option<String>,
    stop: Option<String>,
    date: String,
}

pub async fn debug_trips_handler(params: DebugTripsParams, state: Arc<AppState>) -> Result<impl warp::Reply, warp::Rejection> {
    let timetable = &state.engine.snapshot.timetable;
    let active = timetable.calendar_index.active_services(&params.date);

    let trip_ids: Vec<&str> = if let Some(route_id) = &params.route {
        timetable
            .route_trips
            .get(route_id)
            .into_iter()
            .flatten()
            .filter(|trip| active.contains(&trip.service_id))
            .map(|trip| trip.id.as_str())
            .collect()
    } else if let Some(stop_id) = &params.stop {
        timetable
            .routes_by_stop
            .get(stop_id)
            .into_iter()
            .flatten()
            .filter_map(|route_id| timetable.route_trips.get(route_id))
            .flatten()
            .filter(|trip| active.contains(&trip.service_id) && trip.stop_times.iter().any(|st| &st.stop_id == stop_id))
            .map(|trip| trip.id.as_str())
            .collect()
    } else {
        return Err(warp::reject::custom(ApiError("debug/trips requires route or stop".to_string())));
    };
    Ok(warp::reply::json(&trip_ids))
}

#[derive(Debug, Deserialize)]
pub struct TarifRequest {
    origin: String,
    destination: String,
    product: String,
    class: String,
    profile: String,
}

#[derive(Serialize)]
struct TarifResponse {
    price_cents: Option<u32>,
}

pub async fn tarifs_handler(request: TarifRequest, state: Arc<AppState>) -> Result<impl warp::Reply, warp::Rejection> {
    let price_cents = state
        .tariffs
        .iter()
        .find(|row| {
            row.origin == request.origin
                && row.destination == request.destination
                && row.product == request.product
                && row.class == request.class
                && row.profile == request.profile
        })
        .map(|row| row.price_cents);
    Ok(warp::reply::json(&TarifResponse { price_cents }))
}
