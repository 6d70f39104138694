//! External hazard detector invocation.
//!
//! The detector is an opaque program. It is started with
//! `SAFEPATH_MISSION_FOLDER` pointing at the mission directory, may read
//! `scan_region.json` from there, and must write `detected_hazards.json`
//! (a list of `{lat, lon, source?}` records) before exiting with status 0.

use safepath_core::MissionDir;
use std::time::Duration;
use tokio::process::Command;

use crate::pipeline::PipelineError;

pub const MISSION_FOLDER_ENV: &str = "SAFEPATH_MISSION_FOLDER";

/// Run the configured detector for one mission and wait for it to finish.
pub async fn run_detector(
    command_line: &str,
    mission: &MissionDir,
    timeout: Duration,
) -> Result<(), PipelineError> {
    let mut parts = command_line.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| PipelineError::Detector("detector command is empty".into()))?;

    tracing::info!(mission = %mission.name(), program, "running hazard detector");

    let mut command = Command::new(program);
    command
        .args(parts)
        .env(MISSION_FOLDER_ENV, mission.path())
        .kill_on_drop(true);

    let output = match tokio::time::timeout(timeout, command.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(err)) => {
            return Err(PipelineError::Detector(format!("failed to start {program}: {err}")));
        }
        Err(_) => {
            return Err(PipelineError::Detector(format!(
                "detector timed out after {}s",
                timeout.as_secs()
            )));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        tracing::warn!(
            mission = %mission.name(),
            status = %output.status,
            stderr = %stderr.trim(),
            "hazard detector failed"
        );
        return Err(PipelineError::Detector(format!(
            "detector exited with {}",
            output.status
        )));
    }

    tracing::debug!(mission = %mission.name(), "hazard detector finished");
    Ok(())
}
