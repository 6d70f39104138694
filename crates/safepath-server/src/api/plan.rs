//! Direct planning endpoint.
//!
//! Plans a route from inline hazards without creating a mission folder.

use axum::{extract::State, Json};
use safepath_core::ResultDocument;
use std::sync::Arc;

use crate::pipeline::{plan_with_deadline, MissionRequest, PipelineError};
use crate::state::AppState;

pub async fn plan_route(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MissionRequest>,
) -> Result<Json<ResultDocument>, PipelineError> {
    let (plan_request, rules) = request.to_plan_request(state.rules())?;
    let hazard_count = plan_request.hazards.len();

    let result = plan_with_deadline(plan_request, rules, state.config().plan_timeout()).await?;
    tracing::debug!(hazards = hazard_count, cells = result.grid_path.len(), "direct plan served");

    Ok(Json(ResultDocument::from(&result)))
}
