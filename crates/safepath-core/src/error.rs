//! Error types for the planning engine.

use thiserror::Error;

/// Failures raised by a planning request. All of them are fatal for the request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// Required start, end, or hazard data is absent.
    #[error("required input missing: {0}")]
    InputMissing(String),

    /// An endpoint is not a finite, in-range geographic coordinate.
    #[error("invalid {field} coordinate ({lat}, {lon})")]
    InvalidCoordinate { field: String, lat: f64, lon: f64 },

    /// Grid parameters the engine cannot operate on.
    #[error("invalid safety rules: {0}")]
    InvalidRules(String),

    /// The frontier was exhausted, or an endpoint lies inside a hazard buffer.
    #[error("no safe path could be found")]
    NoPathFound,

    /// The assembled path violates the rasterization contract.
    #[error("internal consistency violation: {0}")]
    InternalConsistency(String),
}
