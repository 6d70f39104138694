//! Mission pipeline: detection, then planning, then persistence.

use safepath_core::mission::HAZARDS_FILE;
use safepath_core::{
    plan_safe_path, GeoPoint, HazardRecord, MissionDir, MissionError, MissionInput, PlanError,
    PlanRequest, PlanResult, ResultDocument, SafetyRules,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::detector;
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Mission(#[from] MissionError),

    #[error("hazard detector failed: {0}")]
    Detector(String),

    #[error("planning exceeded the {0}s deadline")]
    Timeout(u64),

    #[error("planning task failed: {0}")]
    Task(String),
}

impl From<PlanError> for PipelineError {
    fn from(err: PlanError) -> Self {
        Self::Mission(MissionError::Plan(err))
    }
}

/// Body of a mission or direct planning request.
///
/// `hazards` is optional for missions (the detector supplies them) and
/// required for direct planning.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MissionRequest {
    #[serde(flatten)]
    pub input: MissionInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hazards: Option<Vec<HazardRecord>>,
}

impl MissionRequest {
    /// Engine request plus the rules after any per-request override.
    pub fn to_plan_request(
        &self,
        rules: &SafetyRules,
    ) -> Result<(PlanRequest, SafetyRules), PlanError> {
        let request = self.input.to_request(self.hazards.as_deref())?;
        let mut effective = rules.clone();
        if let Some(radius) = self.input.buffer_radius {
            effective.buffer_radius_cells = radius;
        }
        Ok((request, effective))
    }
}

/// A completed mission run.
#[derive(Debug, Clone, Serialize)]
pub struct MissionRun {
    pub mission: String,
    pub result: ResultDocument,
}

/// Plan on the blocking pool under an external deadline.
///
/// The engine has no cancellation point, so on timeout the computation is
/// left to finish in the background and its result is dropped.
pub async fn plan_with_deadline(
    request: PlanRequest,
    rules: SafetyRules,
    deadline: Duration,
) -> Result<PlanResult, PipelineError> {
    let handle = tokio::task::spawn_blocking(move || plan_safe_path(&request, &rules));
    match tokio::time::timeout(deadline, handle).await {
        Ok(Ok(result)) => Ok(result?),
        Ok(Err(join_err)) => Err(PipelineError::Task(join_err.to_string())),
        Err(_) => {
            tracing::warn!(deadline_s = deadline.as_secs(), "planning deadline exceeded; discarding computation");
            Err(PipelineError::Timeout(deadline.as_secs()))
        }
    }
}

/// Run a full mission: create its folder, obtain hazards, plan, save the result.
pub async fn run_mission(
    state: &AppState,
    request: MissionRequest,
) -> Result<MissionRun, PipelineError> {
    // Reject bad endpoints before anything touches disk or starts the detector.
    check_endpoint("start", request.input.start)?;
    check_endpoint("end", request.input.end)?;

    let mission = MissionDir::create_next(state.missions_dir())?;
    tracing::info!(mission = %mission.name(), "mission created");

    mission.write_input(&request.input)?;
    if let Some(region) = &request.input.scan_region {
        mission.write_scan_region(region)?;
    }

    match (&request.hazards, &state.config().detector_cmd) {
        (Some(hazards), _) => mission.write_hazards(hazards)?,
        (None, Some(command)) => {
            detector::run_detector(command, &mission, state.config().detector_timeout()).await?;
            if mission.read_hazards()?.is_none() {
                return Err(PipelineError::Detector(format!(
                    "detector produced no {}",
                    HAZARDS_FILE
                )));
            }
        }
        (None, None) => {
            tracing::debug!(mission = %mission.name(), "no detector configured; expecting hazards on disk")
        }
    }

    let (plan_request, rules) = mission.load_request(state.rules())?;
    let result = plan_with_deadline(plan_request, rules, state.config().plan_timeout()).await?;
    let document = ResultDocument::from(&result);
    mission.write_result(&document)?;

    if let Some(summary) = mission.summary()? {
        state.record_mission(summary);
    }
    tracing::info!(
        mission = %mission.name(),
        hazards = document.hazard_count,
        path_points = document.safe_path.len(),
        "mission complete"
    );

    Ok(MissionRun {
        mission: mission.name().to_string(),
        result: document,
    })
}

fn check_endpoint(field: &str, pair: Option<[f64; 2]>) -> Result<(), PlanError> {
    let [lat, lon] = pair.ok_or_else(|| PlanError::InputMissing(field.to_string()))?;
    if GeoPoint::new(lat, lon).is_valid() {
        Ok(())
    } else {
        Err(PlanError::InvalidCoordinate {
            field: field.to_string(),
            lat,
            lon,
        })
    }
}
