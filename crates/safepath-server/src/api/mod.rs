//! API routes for the SafePath server.

pub mod missions;
pub mod plan;
pub mod request_id;
mod routes;

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json, Router};
use safepath_core::{MissionError, PlanError};
use serde::Serialize;
use std::sync::Arc;

use crate::pipeline::PipelineError;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    routes::create_router()
}

/// Error body returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub reason: String,
}

impl ErrorBody {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            status: "error",
            reason: reason.into(),
        }
    }
}

/// HTTP status for a pipeline failure.
///
/// Bad or incomplete input is the caller's fault; every engine failure,
/// including "no path", is a server-side failure with no partial result.
pub fn status_for(err: &PipelineError) -> StatusCode {
    match err {
        PipelineError::Mission(MissionError::Plan(
            PlanError::InputMissing(_) | PlanError::InvalidCoordinate { .. },
        )) => StatusCode::BAD_REQUEST,
        PipelineError::Mission(MissionError::InvalidName(_)) => StatusCode::BAD_REQUEST,
        PipelineError::Mission(MissionError::NotFound(_)) => StatusCode::NOT_FOUND,
        PipelineError::Timeout(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::info!(error = %self, "request rejected");
        }
        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}
