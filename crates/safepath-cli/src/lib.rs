//! SafePath CLI - command line tools for the safe path planner.
//!
//! Binaries:
//! - plan_mission: plan a mission folder offline
//! - submit_mission: send a mission to a running server
//! - plan_stress: random hazard fields against the engine

pub mod client;
pub mod hazard_field;

pub use client::{MissionSubmission, SafepathClient};
pub use hazard_field::HazardField;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the stderr subscriber used by every binary.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,safepath_core=info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Parse a `lat,lon` pair from the command line.
pub fn parse_lat_lon(value: &str) -> Result<[f64; 2], String> {
    let (lat, lon) = value
        .split_once(',')
        .ok_or_else(|| format!("expected lat,lon but got '{value}'"))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("bad latitude: {e}"))?;
    let lon: f64 = lon.trim().parse().map_err(|e| format!("bad longitude: {e}"))?;
    Ok([lat, lon])
}
