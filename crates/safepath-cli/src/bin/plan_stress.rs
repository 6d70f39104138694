use anyhow::Result;
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use safepath_cli::HazardField;
use safepath_core::{
    assemble, search, GeoPoint, GridCell, Hazard, OccupancyGrid, Origin, PlanError, Projector,
    SafetyRules,
};
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author, version, about = "Random hazard fields against the planner", long_about = None)]
struct Args {
    /// Number of random scenarios
    #[arg(long, default_value_t = 20)]
    runs: usize,

    /// Hazards per scenario
    #[arg(long, default_value_t = 200)]
    hazards: usize,

    /// Grid extent in cells per side
    #[arg(long, default_value_t = 2000)]
    grid_size: usize,

    /// Buffer radius in cells
    #[arg(long, default_value_t = 2)]
    buffer_radius: usize,

    /// RNG seed (random when omitted)
    #[arg(long)]
    seed: Option<u64>,
}

struct RunStats {
    millis: f64,
    nodes: usize,
    path_cells: usize,
}

fn main() -> Result<()> {
    safepath_cli::init_tracing();
    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = StdRng::seed_from_u64(seed);

    let rules = SafetyRules::default()
        .with_grid_size(args.grid_size)
        .with_buffer_radius(args.buffer_radius);
    rules.validate()?;

    // Keep endpoints well inside the grid so the whole field projects without clamping.
    let field_m = args.grid_size as f64 * rules.cell_size_m * 0.2;
    let field = HazardField::new(GeoPoint::new(21.4858, 39.1925), field_m);

    println!(
        "seed={} runs={} hazards={} grid={} buffer={}",
        seed, args.runs, args.hazards, args.grid_size, args.buffer_radius
    );

    let mut completed = Vec::new();
    let mut no_path = 0usize;
    let mut violations = 0usize;

    for run in 0..args.runs {
        let start = field.random_point(&mut rng);
        let goal = field.random_point(&mut rng);
        let hazards = field.scatter(&mut rng, args.hazards);

        match plan_once(&rules, start, goal, &hazards) {
            Ok((stats, unsafe_cells)) => {
                println!(
                    "#{:03} OK   {:>8.1} ms  nodes={:>8} cells={:>5}  hazard check: {}",
                    run,
                    stats.millis,
                    stats.nodes,
                    stats.path_cells,
                    if unsafe_cells == 0 { "PASS".to_string() } else { format!("FAIL ({})", unsafe_cells) }
                );
                if unsafe_cells > 0 {
                    tracing::error!(run, unsafe_cells, "path enters a hazard buffer");
                    violations += 1;
                }
                completed.push(stats);
            }
            Err(PlanError::NoPathFound) => {
                tracing::warn!(run, "no path through hazard field");
                no_path += 1;
            }
            Err(err) => {
                tracing::error!(run, error = %err, "planning failed");
                violations += 1;
            }
        }
    }

    if !completed.is_empty() {
        let total: f64 = completed.iter().map(|s| s.millis).sum();
        let worst = completed.iter().map(|s| s.millis).fold(0.0, f64::max);
        let nodes: usize = completed.iter().map(|s| s.nodes).sum();
        println!(
            "\nplanned={} no_path={} avg={:.1} ms worst={:.1} ms avg_nodes={}",
            completed.len(),
            no_path,
            total / completed.len() as f64,
            worst,
            nodes / completed.len()
        );
    }

    if violations > 0 {
        anyhow::bail!("{} scenario(s) violated the hazard buffer", violations);
    }
    Ok(())
}

/// Plan one scenario stage by stage, then count path cells inside any buffer.
fn plan_once(
    rules: &SafetyRules,
    start: GeoPoint,
    goal: GeoPoint,
    hazards: &[Hazard],
) -> Result<(RunStats, usize), PlanError> {
    let started = Instant::now();

    let projector = Projector::new(Origin::from_endpoints(&start, &goal), rules);
    let mut grid = OccupancyGrid::from_rules(rules);
    grid.rasterize(hazards, &projector, rules.buffer_radius_cells);

    let outcome = search(&grid, projector.to_grid(&start), projector.to_grid(&goal))?;
    let result = assemble(&outcome, &grid, &projector, hazards)?;

    let stats = RunStats {
        millis: started.elapsed().as_secs_f64() * 1000.0,
        nodes: outcome.nodes_expanded,
        path_cells: result.grid_path.len(),
    };

    let hazard_cells: Vec<GridCell> = hazards.iter().map(|h| projector.to_grid(&h.position)).collect();
    let unsafe_cells = result
        .grid_path
        .iter()
        .filter(|cell| {
            hazard_cells
                .iter()
                .any(|h| cell.chebyshev(h) <= rules.buffer_radius_cells)
        })
        .count();

    Ok((stats, unsafe_cells))
}
