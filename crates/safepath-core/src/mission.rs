//! Mission folders: the on-disk contract between the detector, the planner,
//! and whoever consumes the result.
//!
//! A mission is a directory named `mission<N>` holding:
//! - `input.json`: start/end request document
//! - `scan_region.json`: optional area for the detector
//! - `detected_hazards.json`: detector output
//! - `result.json`: planner output
//!
//! The engine itself never touches the filesystem; this module sits on top of it.

use crate::error::PlanError;
use crate::models::{HazardRecord, MissionInput, PlanRequest, ResultDocument, ScanRegion};
use crate::routing::plan_safe_path;
use crate::rules::SafetyRules;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const MISSION_PREFIX: &str = "mission";
pub const INPUT_FILE: &str = "input.json";
pub const SCAN_REGION_FILE: &str = "scan_region.json";
pub const HAZARDS_FILE: &str = "detected_hazards.json";
pub const RESULT_FILE: &str = "result.json";

#[derive(Debug, Error)]
pub enum MissionError {
    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("mission not found: {0}")]
    NotFound(String),

    #[error("invalid mission or file name: {0}")]
    InvalidName(String),
}

impl MissionError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Listing entry for a completed mission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionSummary {
    pub id: String,
    pub hazard_count: usize,
    pub path_points: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Handle to one mission folder.
#[derive(Debug, Clone)]
pub struct MissionDir {
    name: String,
    path: PathBuf,
}

impl MissionDir {
    /// Open an existing mission folder under `base`.
    pub fn open(base: &Path, name: &str) -> Result<Self, MissionError> {
        validate_component(name)?;
        let path = base.join(name);
        if !path.is_dir() {
            return Err(MissionError::NotFound(name.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            path,
        })
    }

    /// Create the next `mission<N>` folder under `base`.
    ///
    /// A concurrent creator taking the same number makes this one rescan.
    pub fn create_next(base: &Path) -> Result<Self, MissionError> {
        const MAX_ATTEMPTS: usize = 16;
        fs::create_dir_all(base).map_err(|e| MissionError::io(base, e))?;
        let mut attempt = 0;
        loop {
            let name = next_mission_name(base)?;
            let path = base.join(&name);
            match fs::create_dir(&path) {
                Ok(()) => return Ok(Self { name, path }),
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists && attempt + 1 < MAX_ATTEMPTS => {
                    attempt += 1;
                }
                Err(err) => return Err(MissionError::io(&path, err)),
            }
        }
    }

    /// Wrap an arbitrary directory (e.g. one given on the command line).
    pub fn at(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { name, path }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path to a file inside the mission, rejecting traversal.
    pub fn file_path(&self, file: &str) -> Result<PathBuf, MissionError> {
        validate_component(file)?;
        Ok(self.path.join(file))
    }

    pub fn write_input(&self, input: &MissionInput) -> Result<(), MissionError> {
        write_json(&self.path.join(INPUT_FILE), input)
    }

    pub fn read_input(&self) -> Result<MissionInput, MissionError> {
        read_json(&self.path.join(INPUT_FILE))?
            .ok_or_else(|| PlanError::InputMissing(INPUT_FILE.into()).into())
    }

    pub fn write_scan_region(&self, region: &ScanRegion) -> Result<(), MissionError> {
        write_json(&self.path.join(SCAN_REGION_FILE), region)
    }

    pub fn write_hazards(&self, hazards: &[HazardRecord]) -> Result<(), MissionError> {
        write_json(&self.path.join(HAZARDS_FILE), &hazards)
    }

    /// `None` when the detector has not produced its output file.
    pub fn read_hazards(&self) -> Result<Option<Vec<HazardRecord>>, MissionError> {
        read_json(&self.path.join(HAZARDS_FILE))
    }

    pub fn write_result(&self, result: &ResultDocument) -> Result<(), MissionError> {
        write_json(&self.path.join(RESULT_FILE), result)
    }

    pub fn read_result(&self) -> Result<Option<ResultDocument>, MissionError> {
        read_json(&self.path.join(RESULT_FILE))
    }

    /// Build the engine request and the effective rules for this mission.
    pub fn load_request(
        &self,
        rules: &SafetyRules,
    ) -> Result<(PlanRequest, SafetyRules), MissionError> {
        let input = self.read_input()?;
        let hazards = self.read_hazards()?;
        let request = input.to_request(hazards.as_deref())?;
        let mut effective = rules.clone();
        if let Some(radius) = input.buffer_radius {
            effective.buffer_radius_cells = radius;
        }
        Ok((request, effective))
    }

    /// Read inputs, plan, and write `result.json`.
    pub fn plan(&self, rules: &SafetyRules) -> Result<ResultDocument, MissionError> {
        let (request, effective) = self.load_request(rules)?;
        let result = plan_safe_path(&request, &effective)?;
        let document = ResultDocument::from(&result);
        self.write_result(&document)?;
        tracing::info!(mission = %self.name, path = %self.path.join(RESULT_FILE).display(), "safe path saved");
        Ok(document)
    }

    /// Summary for listings, or `None` when there is no readable result.
    pub fn summary(&self) -> Result<Option<MissionSummary>, MissionError> {
        let result_path = self.path.join(RESULT_FILE);
        let Some(result) = self.read_result()? else {
            return Ok(None);
        };
        let completed_at = fs::metadata(&result_path)
            .and_then(|meta| meta.modified())
            .ok()
            .map(DateTime::<Utc>::from);
        Ok(Some(MissionSummary {
            id: self.name.clone(),
            hazard_count: result.hazard_count,
            path_points: result.safe_path.len(),
            completed_at,
        }))
    }
}

/// Numeric suffix of a `mission<N>` folder name.
pub fn mission_number(name: &str) -> Option<u64> {
    let digits = name.strip_prefix(MISSION_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// `mission<max+1>` over the existing `mission<N>` folders in `base`.
pub fn next_mission_name(base: &Path) -> Result<String, MissionError> {
    let mut highest = 0u64;
    if base.is_dir() {
        for entry in fs::read_dir(base).map_err(|e| MissionError::io(base, e))? {
            let entry = entry.map_err(|e| MissionError::io(base, e))?;
            if let Some(n) = mission_number(&entry.file_name().to_string_lossy()) {
                highest = highest.max(n);
            }
        }
    }
    Ok(format!("{}{}", MISSION_PREFIX, highest + 1))
}

/// Summaries of every mission under `base` with a readable result, sorted by name.
pub fn list_missions(base: &Path) -> Result<Vec<MissionSummary>, MissionError> {
    if !base.is_dir() {
        return Ok(Vec::new());
    }
    let mut names: Vec<String> = fs::read_dir(base)
        .map_err(|e| MissionError::io(base, e))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();

    let mut missions = Vec::new();
    for name in names {
        let dir = MissionDir::at(base.join(&name));
        match dir.summary() {
            Ok(Some(summary)) => missions.push(summary),
            Ok(None) => {}
            Err(err) => tracing::warn!(mission = %name, error = %err, "failed to load mission result"),
        }
    }
    Ok(missions)
}

fn validate_component(name: &str) -> Result<(), MissionError> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name.contains('\0');
    if bad {
        return Err(MissionError::InvalidName(name.to_string()));
    }
    Ok(())
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), MissionError> {
    let body = serde_json::to_vec_pretty(value).map_err(|source| MissionError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, body).map_err(|e| MissionError::io(path, e))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, MissionError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(MissionError::io(path, err)),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| MissionError::Json {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoPoint;

    fn temp_base() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("safepath-missions-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn mission_names_increment_past_highest() {
        let base = temp_base();
        assert_eq!(next_mission_name(&base).unwrap(), "mission1");
        fs::create_dir(base.join("mission3")).unwrap();
        fs::create_dir(base.join("mission10")).unwrap();
        fs::create_dir(base.join("missionX")).unwrap();
        fs::create_dir(base.join("notes")).unwrap();
        assert_eq!(next_mission_name(&base).unwrap(), "mission11");

        let created = MissionDir::create_next(&base).unwrap();
        assert_eq!(created.name(), "mission11");
        assert!(created.path().is_dir());
        fs::remove_dir_all(&base).ok();
    }

    #[test]
    fn mission_number_parsing() {
        assert_eq!(mission_number("mission7"), Some(7));
        assert_eq!(mission_number("mission"), None);
        assert_eq!(mission_number("mission-1"), None);
        assert_eq!(mission_number("run7"), None);
    }

    #[test]
    fn plan_writes_result_and_lists_summary() {
        let base = temp_base();
        let mission = MissionDir::create_next(&base).unwrap();
        mission
            .write_input(&MissionInput::new(
                GeoPoint::new(21.0, 39.0),
                GeoPoint::new(21.001, 39.001),
            ))
            .unwrap();
        mission
            .write_hazards(&[HazardRecord::new(21.0005, 39.0005)])
            .unwrap();

        let rules = SafetyRules::default().with_grid_size(200);
        let document = mission.plan(&rules).unwrap();
        assert_eq!(document.hazard_count, 1);
        assert!(document.safe_path.len() >= 2);
        assert_eq!(mission.read_result().unwrap(), Some(document.clone()));

        let missions = list_missions(&base).unwrap();
        assert_eq!(missions.len(), 1);
        assert_eq!(missions[0].id, "mission1");
        assert_eq!(missions[0].hazard_count, 1);
        assert_eq!(missions[0].path_points, document.safe_path.len());
        fs::remove_dir_all(&base).ok();
    }

    #[test]
    fn missing_hazard_file_is_input_missing() {
        let base = temp_base();
        let mission = MissionDir::create_next(&base).unwrap();
        mission
            .write_input(&MissionInput::new(
                GeoPoint::new(21.0, 39.0),
                GeoPoint::new(21.001, 39.001),
            ))
            .unwrap();
        let err = mission.plan(&SafetyRules::default()).unwrap_err();
        assert!(matches!(err, MissionError::Plan(PlanError::InputMissing(ref f)) if f == "hazards"));
        assert!(mission.read_result().unwrap().is_none());
        fs::remove_dir_all(&base).ok();
    }

    #[test]
    fn buffer_radius_override_applies() {
        let base = temp_base();
        let mission = MissionDir::create_next(&base).unwrap();
        let mut input = MissionInput::new(GeoPoint::new(21.0, 39.0), GeoPoint::new(21.001, 39.001));
        input.buffer_radius = Some(5);
        mission.write_input(&input).unwrap();
        mission.write_hazards(&[]).unwrap();
        let (_, effective) = mission.load_request(&SafetyRules::default()).unwrap();
        assert_eq!(effective.buffer_radius_cells, 5);
        fs::remove_dir_all(&base).ok();
    }

    #[test]
    fn listing_skips_unreadable_results() {
        let base = temp_base();
        let broken = MissionDir::create_next(&base).unwrap();
        fs::write(broken.path().join(RESULT_FILE), b"{ not json").unwrap();
        MissionDir::create_next(&base).unwrap();
        assert!(list_missions(&base).unwrap().is_empty());
        fs::remove_dir_all(&base).ok();
    }

    #[test]
    fn file_paths_reject_traversal() {
        let base = temp_base();
        let mission = MissionDir::create_next(&base).unwrap();
        assert!(mission.file_path(RESULT_FILE).is_ok());
        assert!(matches!(mission.file_path("../secret"), Err(MissionError::InvalidName(_))));
        assert!(matches!(MissionDir::open(&base, ".."), Err(MissionError::InvalidName(_))));
        assert!(matches!(MissionDir::open(&base, "mission99"), Err(MissionError::NotFound(_))));
        fs::remove_dir_all(&base).ok();
    }
}
