//! REST API routes.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::api::{missions, plan, request_id};
use crate::state::AppState;

/// Create the API router.
pub fn create_router() -> Router<Arc<AppState>> {
    let mission_routes = Router::new()
        .route(
            "/v1/missions",
            post(missions::run_mission).get(missions::list_missions),
        )
        .route("/v1/missions/:mission_id", get(missions::get_mission))
        .route("/v1/missions/:mission_id/:filename", get(missions::get_mission_file));

    let plan_routes = Router::new().route("/v1/plan", post(plan::plan_route));

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .merge(mission_routes)
        .merge(plan_routes)
        .layer(middleware::from_fn(request_id::ensure_request_id))
}
