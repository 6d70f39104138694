//! Server configuration from environment.

use safepath_core::SafetyRules;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    /// Directory holding `mission<N>` folders
    pub missions_dir: PathBuf,
    /// External hazard detector, run once per mission (program followed by arguments)
    pub detector_cmd: Option<String>,
    pub detector_timeout_s: u64,
    pub grid_size: usize,
    pub cell_size_m: f64,
    pub buffer_radius_cells: usize,
    /// Deadline for one planning computation
    pub plan_timeout_s: u64,
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        let rules = SafetyRules::default();
        Self {
            server_port: 3000,
            missions_dir: PathBuf::from("missions"),
            detector_cmd: None,
            detector_timeout_s: 600,
            grid_size: rules.grid_rows,
            cell_size_m: rules.cell_size_m,
            buffer_radius_cells: rules.buffer_radius_cells,
            plan_timeout_s: 30,
            log_json: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_parse("SAFEPATH_PORT", defaults.server_port),
            missions_dir: env::var("SAFEPATH_MISSIONS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.missions_dir),
            detector_cmd: env::var("SAFEPATH_DETECTOR_CMD")
                .ok()
                .map(|cmd| cmd.trim().to_string())
                .filter(|cmd| !cmd.is_empty()),
            detector_timeout_s: env_parse("SAFEPATH_DETECTOR_TIMEOUT_S", defaults.detector_timeout_s),
            grid_size: env_parse("SAFEPATH_GRID_SIZE", defaults.grid_size),
            cell_size_m: env_parse("SAFEPATH_CELL_SIZE_M", defaults.cell_size_m),
            buffer_radius_cells: env_parse("SAFEPATH_BUFFER_RADIUS", defaults.buffer_radius_cells),
            plan_timeout_s: env_parse("SAFEPATH_PLAN_TIMEOUT_S", defaults.plan_timeout_s),
            log_json: env::var("SAFEPATH_LOG_JSON")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.log_json),
        }
    }

    /// Engine rules derived from this configuration.
    pub fn rules(&self) -> SafetyRules {
        SafetyRules::default()
            .with_grid_size(self.grid_size)
            .with_cell_size(self.cell_size_m)
            .with_buffer_radius(self.buffer_radius_cells)
    }

    pub fn plan_timeout(&self) -> Duration {
        Duration::from_secs(self.plan_timeout_s)
    }

    pub fn detector_timeout(&self) -> Duration {
        Duration::from_secs(self.detector_timeout_s)
    }
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
