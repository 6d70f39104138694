//! HTTP client for the SafePath server.

use anyhow::{Context, Result};
use safepath_core::{HazardRecord, MissionInput, MissionSummary, ResultDocument};
use serde::{Deserialize, Serialize};

/// Request body for `/v1/missions` and `/v1/plan`.
#[derive(Debug, Clone, Serialize)]
pub struct MissionSubmission {
    #[serde(flatten)]
    pub input: MissionInput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hazards: Option<Vec<HazardRecord>>,
}

#[derive(Debug, Deserialize)]
pub struct MissionRunResponse {
    pub status: String,
    pub mission: String,
    pub result: ResultDocument,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    reason: String,
}

/// Client for a running SafePath server.
pub struct SafepathClient {
    base_url: String,
    client: reqwest::Client,
}

impl SafepathClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// True when `/health` answers.
    pub async fn health(&self) -> Result<bool> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(response.status().is_success())
    }

    /// Run a full mission on the server.
    pub async fn run_mission(&self, submission: &MissionSubmission) -> Result<MissionRunResponse> {
        let url = format!("{}/v1/missions", self.base_url);
        let response = self.client.post(&url).json(submission).send().await?;
        Self::parse(response, "Mission failed").await
    }

    /// Plan directly from inline hazards without creating a mission.
    pub async fn plan(&self, submission: &MissionSubmission) -> Result<ResultDocument> {
        let url = format!("{}/v1/plan", self.base_url);
        let response = self.client.post(&url).json(submission).send().await?;
        Self::parse(response, "Planning failed").await
    }

    pub async fn list_missions(&self) -> Result<Vec<MissionSummary>> {
        let url = format!("{}/v1/missions", self.base_url);
        let response = self.client.get(&url).send().await?;
        Self::parse(response, "Failed to list missions").await
    }

    /// Fetch one stored document of a mission, e.g. `result.json`.
    pub async fn mission_file(&self, mission: &str, file: &str) -> Result<serde_json::Value> {
        let url = format!("{}/v1/missions/{}/{}", self.base_url, mission, file);
        let response = self.client.get(&url).send().await?;
        Self::parse(response, "Failed to fetch mission file").await
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        what: &str,
    ) -> Result<T> {
        let status = response.status();
        tracing::debug!(url = %response.url(), status = status.as_u16(), "server responded");
        if !status.is_success() {
            let reason = response
                .json::<ErrorResponse>()
                .await
                .map(|body| body.reason)
                .unwrap_or_else(|_| "no reason given".to_string());
            anyhow::bail!("{}: {} ({})", what, reason, status);
        }
        response
            .json()
            .await
            .with_context(|| format!("{}: malformed response body", what))
    }
}
