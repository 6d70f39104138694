pub mod error;
pub mod mission;
pub mod models;
pub mod occupancy;
pub mod route_engine;
pub mod routing;
pub mod rules;
pub mod spatial;

pub use error::PlanError;
pub use mission::{list_missions, next_mission_name, MissionDir, MissionError, MissionSummary};
pub use models::{
    GeoPoint, GridCell, Hazard, HazardRecord, MissionInput, PlanRequest, PlanResult,
    ResultDocument, ScanRegion,
};
pub use occupancy::OccupancyGrid;
pub use route_engine::{search, SearchOutcome};
pub use routing::{assemble, plan_safe_path};
pub use rules::SafetyRules;
pub use spatial::{haversine_distance, Origin, Projector};
