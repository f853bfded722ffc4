//! The warp HTTP surface: static asset serving plus the JSON API, composed
//! the way the teacher's `webserver.rs` composes `warp::fs::dir(..).or(..)`.

pub mod handlers;
pub mod state;

use std::path::Path;
use std::sync::Arc;

use warp::Filter;

pub use state::AppState;

fn search_route(state: Arc<AppState>) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("api" / "search")
        .and(warp::get())
        .and(warp::query::<handlers::SearchParams>())
        .and(handlers::with_data(state))
        .and_then(handlers::search_handler)
}

fn explore_route(state: Arc<AppState>) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("api" / "explore")
        .and(warp::get())
        .and(warp::query::<handlers::ExploreParams>())
        .and(handlers::with_data(state))
        .and_then(handlers::explore_handler)
}

fn stops_route(state: Arc<AppState>) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("api" / "stops")
        .and(warp::get())
        .and(warp::query::<handlers::AutocompleteParams>())
        .and(handlers::with_data(state))
        .and_then(handlers::stops_handler)
}

fn cities_route(state: Arc<AppState>) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("api" / "cities")
        .and(warp::get())
        .and(warp::query::<handlers::AutocompleteParams>())
        .and(handlers::with_data(state))
        .and_then(handlers::cities_handler)
}

fn meta_route(state: Arc<AppState>) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("api" / "meta")
        .and(warp::get())
        .and(handlers::with_data(state))
        .and_then(handlers::meta_handler)
}

fn debug_trips_route(state: Arc<AppState>) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("api" / "debug" / "trips")
        .and(warp::get())
        .and(warp::query::<handlers::DebugTripsParams>())
        .and(handlers::with_data(state))
        .and_then(handlers::debug_trips_handler)
}

fn tarifs_route(state: Arc<AppState>) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("api" / "tarifs")
        .and(warp::post())
        .and(warp::body::json())
        .and(handlers::with_data(state))
        .and_then(handlers::tarifs_handler)
}

/// Composes the whole API surface plus static file serving, under CORS
/// allowing any origin, matching the teacher's `json_tree_route`.
pub fn routes(state: Arc<AppState>, static_dir: &Path) -> impl Filter<Extract = impl warp::Reply, Error = std::convert::Infallible> + Clone {
    let cors = warp::cors().allow_any_origin();
    let api = search_route(state.clone())
        .or(explore_route(state.clone()))
        .or(stops_route(state.clone()))
        .or(cities_route(state.clone()))
        .or(meta_route(state.clone()))
        .or(debug_trips_route(state.clone()))
        .or(tarifs_route(state));

    warp::fs::dir(static_dir.to_path_buf())
        .or(api)
        .with(cors)
        .recover(handlers::handle_rejection)
}
