//! Core data models for the planner and the mission documents it exchanges.

use crate::error::PlanError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// True when both components are finite and within WGS84 bounds.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    pub fn as_pair(&self) -> [f64; 2] {
        [self.latitude, self.longitude]
    }
}

impl From<[f64; 2]> for GeoPoint {
    fn from(pair: [f64; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }
}

/// A cell index on the occupancy grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
}

impl GridCell {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Chebyshev (king-move) distance between two cells.
    pub fn chebyshev(&self, other: &GridCell) -> usize {
        self.row.abs_diff(other.row).max(self.col.abs_diff(other.col))
    }

    /// Manhattan (L1) distance between two cells.
    pub fn manhattan(&self, other: &GridCell) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    pub fn as_pair(&self) -> [usize; 2] {
        [self.row, self.col]
    }
}

/// A reported hazard location, owned by the detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    pub position: GeoPoint,
    pub source: Option<String>,
    /// Detector fields the engine does not interpret (confidence, class, ...).
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl Hazard {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            position: GeoPoint::new(latitude, longitude),
            source: None,
            attributes: Map::new(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Everything needed to plan one route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub start: GeoPoint,
    pub goal: GeoPoint,
    pub hazards: Vec<Hazard>,
}

/// A complete, validated plan. Produced once per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    pub safe_path: Vec<GeoPoint>,
    pub grid_path: Vec<GridCell>,
    pub hazard_count: usize,
    pub hazards: Vec<Hazard>,
}

// === Mission documents ===

/// Request document (`input.json`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionInput {
    /// [lat, lon]
    #[serde(default)]
    pub start: Option<[f64; 2]>,
    /// [lat, lon]
    #[serde(default)]
    pub end: Option<[f64; 2]>,
    /// Per-request override of the hazard buffer radius, in cells
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_radius: Option<usize>,
    /// Area handed to the detector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_region: Option<ScanRegion>,
}

impl MissionInput {
    pub fn new(start: GeoPoint, end: GeoPoint) -> Self {
        Self {
            start: Some(start.as_pair()),
            end: Some(end.as_pair()),
            buffer_radius: None,
            scan_region: None,
        }
    }

    /// Combine with the detector's hazard list into an engine request.
    pub fn to_request(&self, hazards: Option<&[HazardRecord]>) -> Result<PlanRequest, PlanError> {
        let start = self
            .start
            .ok_or_else(|| PlanError::InputMissing("start".into()))?;
        let end = self
            .end
            .ok_or_else(|| PlanError::InputMissing("end".into()))?;
        let hazards = hazards.ok_or_else(|| PlanError::InputMissing("hazards".into()))?;

        Ok(PlanRequest {
            start: start.into(),
            goal: end.into(),
            hazards: hazards.iter().map(Hazard::from).collect(),
        })
    }
}

/// Area the detector should scan (`scan_region.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRegion {
    #[serde(alias = "topLeft")]
    pub top_left: [f64; 2],
    #[serde(alias = "bottomRight")]
    pub bottom_right: [f64; 2],
}

/// One detector output record (`detected_hazards.json`).
///
/// Fields other than `lat`, `lon` and `source` are kept as-is so the result
/// echoes the detector's records unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardRecord {
    pub lat: f64,
    pub lon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HazardRecord {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            source: None,
            extra: Map::new(),
        }
    }
}

impl From<&HazardRecord> for Hazard {
    fn from(record: &HazardRecord) -> Self {
        Self {
            position: GeoPoint::new(record.lat, record.lon),
            source: record.source.clone(),
            attributes: record.extra.clone(),
        }
    }
}

impl From<&Hazard> for HazardRecord {
    fn from(hazard: &Hazard) -> Self {
        Self {
            lat: hazard.position.latitude,
            lon: hazard.position.longitude,
            source: hazard.source.clone(),
            extra: hazard.attributes.clone(),
        }
    }
}

/// Result document (`result.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultDocument {
    pub safe_path: Vec<[f64; 2]>,
    pub grid_path: Vec<[usize; 2]>,
    pub detected_hazards: Vec<HazardRecord>,
    pub hazard_count: usize,
}

impl From<&PlanResult> for ResultDocument {
    fn from(result: &PlanResult) -> Self {
        Self {
            safe_path: result.safe_path.iter().map(GeoPoint::as_pair).collect(),
            grid_path: result.grid_path.iter().map(GridCell::as_pair).collect(),
            detected_hazards: result.hazards.iter().map(HazardRecord::from).collect(),
            hazard_count: result.hazard_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mission_input_requires_both_endpoints() {
        let input: MissionInput = serde_json::from_value(json!({ "start": [21.0, 39.0] })).unwrap();
        let err = input.to_request(Some(&[])).unwrap_err();
        assert_eq!(err, PlanError::InputMissing("end".into()));

        let input: MissionInput = serde_json::from_value(json!({ "end": [21.0, 39.0] })).unwrap();
        let err = input.to_request(Some(&[])).unwrap_err();
        assert_eq!(err, PlanError::InputMissing("start".into()));
    }

    #[test]
    fn mission_input_requires_hazard_list() {
        let input = MissionInput::new(GeoPoint::new(21.0, 39.0), GeoPoint::new(21.001, 39.001));
        assert_eq!(
            input.to_request(None).unwrap_err(),
            PlanError::InputMissing("hazards".into())
        );
    }

    #[test]
    fn hazard_records_keep_optional_source() {
        let records: Vec<HazardRecord> = serde_json::from_value(json!([
            { "lat": 21.0005, "lon": 39.0005 },
            { "lat": 21.0007, "lon": 39.0002, "source": "frame_0012.png" }
        ]))
        .unwrap();
        let input = MissionInput::new(GeoPoint::new(21.0, 39.0), GeoPoint::new(21.001, 39.001));
        let request = input.to_request(Some(&records)).unwrap();
        assert_eq!(request.hazards.len(), 2);
        assert_eq!(request.hazards[0].source, None);
        assert_eq!(request.hazards[1].source.as_deref(), Some("frame_0012.png"));

        let echoed = serde_json::to_value(HazardRecord::from(&request.hazards[0])).unwrap();
        assert_eq!(echoed, json!({ "lat": 21.0005, "lon": 39.0005 }));
    }

    #[test]
    fn detector_fields_survive_into_the_result() {
        let records: Vec<HazardRecord> = serde_json::from_value(json!([
            { "lat": 21.0005, "lon": 39.0005, "source": "frame_0003.jpg", "confidence": 0.87, "class": "debris" }
        ]))
        .unwrap();
        let input = MissionInput::new(GeoPoint::new(21.0, 39.0), GeoPoint::new(21.001, 39.001));
        let request = input.to_request(Some(&records)).unwrap();
        assert_eq!(request.hazards[0].attributes["confidence"], json!(0.87));

        let result = PlanResult {
            safe_path: vec![GeoPoint::new(21.0, 39.0)],
            grid_path: vec![GridCell::new(0, 0)],
            hazard_count: 1,
            hazards: request.hazards,
        };
        let value = serde_json::to_value(ResultDocument::from(&result)).unwrap();
        assert_eq!(
            value["detectedHazards"][0],
            json!({ "lat": 21.0005, "lon": 39.0005, "source": "frame_0003.jpg", "confidence": 0.87, "class": "debris" })
        );
    }

    #[test]
    fn result_document_uses_wire_field_names() {
        let result = PlanResult {
            safe_path: vec![GeoPoint::new(21.0, 39.0), GeoPoint::new(21.00002, 39.00002)],
            grid_path: vec![GridCell::new(0, 0), GridCell::new(1, 1)],
            hazard_count: 1,
            hazards: vec![Hazard::new(21.0005, 39.0005).with_source("yolo")],
        };
        let value = serde_json::to_value(ResultDocument::from(&result)).unwrap();
        assert_eq!(value["gridPath"], json!([[0, 0], [1, 1]]));
        assert_eq!(value["safePath"][0], json!([21.0, 39.0]));
        assert_eq!(value["hazardCount"], json!(1));
        assert_eq!(value["detectedHazards"][0]["source"], json!("yolo"));
    }

    #[test]
    fn cell_distances() {
        let a = GridCell::new(3, 10);
        let b = GridCell::new(7, 4);
        assert_eq!(a.chebyshev(&b), 6);
        assert_eq!(a.manhattan(&b), 10);
    }
}
