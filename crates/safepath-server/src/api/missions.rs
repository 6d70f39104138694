//! Mission API endpoints.
//!
//! Runs missions end to end and serves their stored documents.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use safepath_core::{MissionDir, MissionError, MissionSummary, ResultDocument};
use serde::Serialize;
use std::sync::Arc;

use crate::api::ErrorBody;
use crate::pipeline::{self, MissionRequest, PipelineError};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RunMissionResponse {
    pub status: &'static str,
    pub mission: String,
    pub result: ResultDocument,
}

/// Run a new mission.
pub async fn run_mission(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MissionRequest>,
) -> Result<Json<RunMissionResponse>, PipelineError> {
    let run = pipeline::run_mission(&state, request).await?;
    Ok(Json(RunMissionResponse {
        status: "success",
        mission: run.mission,
        result: run.result,
    }))
}

/// List every mission folder with a readable result.
///
/// The folders are rescanned on each call so missions planned or removed
/// outside the server show up immediately.
pub async fn list_missions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MissionSummary>>, PipelineError> {
    let missions = tokio::task::spawn_blocking(move || state.reload_missions())
        .await
        .map_err(|err| PipelineError::Task(err.to_string()))??;
    tracing::debug!(count = missions.len(), "mission folders scanned");
    Ok(Json(missions))
}

/// Get the summary of one mission.
pub async fn get_mission(
    State(state): State<Arc<AppState>>,
    Path(mission_id): Path<String>,
) -> Result<Json<MissionSummary>, PipelineError> {
    // A folder removed on disk must not be served from the index.
    let mission = match MissionDir::open(state.missions_dir(), &mission_id) {
        Ok(mission) => mission,
        Err(err) => {
            state.forget_mission(&mission_id);
            return Err(err.into());
        }
    };
    if let Some(summary) = state.get_mission(&mission_id) {
        return Ok(Json(summary));
    }
    match mission.summary()? {
        Some(summary) => {
            state.record_mission(summary.clone());
            Ok(Json(summary))
        }
        None => Err(MissionError::NotFound(mission_id).into()),
    }
}

/// Serve a stored mission document (input, hazards, result, ...).
pub async fn get_mission_file(
    State(state): State<Arc<AppState>>,
    Path((mission_id, filename)): Path<(String, String)>,
) -> Result<Response, PipelineError> {
    let mission = MissionDir::open(state.missions_dir(), &mission_id)?;
    let path = mission.file_path(&filename)?;

    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(([(header::CONTENT_TYPE, content_type(&filename))], bytes).into_response()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok((
            StatusCode::NOT_FOUND,
            Json(ErrorBody::new(format!("file not found: {mission_id}/{filename}"))),
        )
            .into_response()),
        Err(source) => Err(MissionError::Io { path, source }.into()),
    }
}

fn content_type(filename: &str) -> &'static str {
    match filename.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()) {
        Some(ext) if ext == "json" => "application/json",
        Some(ext) if ext == "png" => "image/png",
        Some(ext) if ext == "jpg" || ext == "jpeg" => "image/jpeg",
        Some(ext) if ext == "txt" || ext == "log" => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}
