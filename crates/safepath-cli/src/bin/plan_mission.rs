use anyhow::{Context, Result};
use clap::Parser;
use safepath_core::spatial::path_length_m;
use safepath_core::{plan_safe_path, MissionDir, ResultDocument, SafetyRules};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Plan a mission folder offline", long_about = None)]
struct Args {
    /// Mission folder holding input.json and detected_hazards.json
    #[arg(long)]
    mission: PathBuf,

    /// Buffer radius in cells (overrides input.json)
    #[arg(long)]
    buffer_radius: Option<usize>,

    /// Grid extent in cells per side
    #[arg(long, default_value_t = 2000)]
    grid_size: usize,

    /// Cell edge length in metres
    #[arg(long, default_value_t = 2.0)]
    cell_size: f64,
}

fn main() -> Result<()> {
    safepath_cli::init_tracing();
    let args = Args::parse();

    let rules = SafetyRules::default()
        .with_grid_size(args.grid_size)
        .with_cell_size(args.cell_size);
    let mission = MissionDir::at(args.mission.clone());

    let (request, mut effective) = mission
        .load_request(&rules)
        .with_context(|| format!("failed to load mission {}", args.mission.display()))?;
    if let Some(radius) = args.buffer_radius {
        tracing::debug!(radius, "buffer radius overridden from the command line");
        effective.buffer_radius_cells = radius;
    }

    let result = plan_safe_path(&request, &effective).context("planning failed")?;
    let document = ResultDocument::from(&result);
    mission.write_result(&document)?;

    let length_m = path_length_m(&result.safe_path);

    println!("Mission: {}", mission.name());
    println!("Hazards: {}", document.hazard_count);
    println!("Path points: {}", document.safe_path.len());
    println!("Path length: {:.1} m", length_m);
    tracing::info!(
        mission = %mission.name(),
        path = %args.mission.join(safepath_core::mission::RESULT_FILE).display(),
        "result saved"
    );
    Ok(())
}
