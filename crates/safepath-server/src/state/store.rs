//! In-memory mission index using DashMap.
//!
//! Mission folders on disk are the source of truth; the index only saves
//! re-reading `result.json` for single-mission lookups. Planning state is never shared here: each
//! request builds its own grid.

use dashmap::DashMap;
use safepath_core::{list_missions, MissionError, MissionSummary, SafetyRules};
use std::path::Path;

use crate::config::Config;

/// Application state shared by all handlers.
pub struct AppState {
    config: Config,
    rules: SafetyRules,
    missions: DashMap<String, MissionSummary>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let rules = config.rules();
        Self {
            config,
            rules,
            missions: DashMap::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Default engine rules for new requests.
    pub fn rules(&self) -> &SafetyRules {
        &self.rules
    }

    pub fn missions_dir(&self) -> &Path {
        &self.config.missions_dir
    }

    /// Rescan the missions directory, sync the index to it, and return the scan.
    pub fn reload_missions(&self) -> Result<Vec<MissionSummary>, MissionError> {
        let summaries = list_missions(self.missions_dir())?;
        for summary in &summaries {
            self.missions.insert(summary.id.clone(), summary.clone());
        }
        self.missions
            .retain(|id, _| summaries.iter().any(|summary| &summary.id == id));
        Ok(summaries)
    }

    /// Record a freshly completed mission.
    pub fn record_mission(&self, summary: MissionSummary) {
        self.missions.insert(summary.id.clone(), summary);
    }

    pub fn forget_mission(&self, id: &str) {
        self.missions.remove(id);
    }

    pub fn get_mission(&self, id: &str) -> Option<MissionSummary> {
        self.missions.get(id).map(|entry| entry.value().clone())
    }
}
