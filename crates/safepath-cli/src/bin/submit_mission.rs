use anyhow::{Context, Result};
use clap::Parser;
use safepath_cli::{parse_lat_lon, MissionSubmission, SafepathClient};
use safepath_core::{HazardRecord, MissionInput};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Submit a mission to a SafePath server", long_about = None)]
struct Args {
    /// SafePath server URL
    #[arg(long, default_value = "http://localhost:3000")]
    url: String,

    /// Start as lat,lon
    #[arg(long, value_parser = parse_lat_lon, allow_hyphen_values = true)]
    start: [f64; 2],

    /// End as lat,lon
    #[arg(long, value_parser = parse_lat_lon, allow_hyphen_values = true)]
    end: [f64; 2],

    /// JSON file with a list of {lat, lon, source?} hazards
    #[arg(long)]
    hazards: Option<PathBuf>,

    /// Buffer radius in cells
    #[arg(long)]
    buffer_radius: Option<usize>,

    /// Plan directly without creating a mission (requires --hazards)
    #[arg(long, default_value_t = false)]
    direct: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    safepath_cli::init_tracing();
    let args = Args::parse();

    let hazards = match &args.hazards {
        Some(path) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let records: Vec<HazardRecord> = serde_json::from_slice(&bytes)
                .with_context(|| format!("malformed hazards in {}", path.display()))?;
            Some(records)
        }
        None => None,
    };
    if args.direct && hazards.is_none() {
        anyhow::bail!("--direct requires --hazards");
    }

    let submission = MissionSubmission {
        input: MissionInput {
            start: Some(args.start),
            end: Some(args.end),
            buffer_radius: args.buffer_radius,
            scan_region: None,
        },
        hazards,
    };

    let client = SafepathClient::new(args.url);
    if !client.health().await.unwrap_or(false) {
        anyhow::bail!("server at {} is not reachable", client.base_url());
    }

    let result = if args.direct {
        println!("Requesting direct plan...");
        client.plan(&submission).await?
    } else {
        println!("Submitting mission...");
        let run = client.run_mission(&submission).await?;
        println!("Mission: {} ({})", run.mission, run.status);
        run.result
    };

    println!("Hazards: {}", result.hazard_count);
    println!("Path points: {}", result.safe_path.len());
    if let (Some(first), Some(last)) = (result.safe_path.first(), result.safe_path.last()) {
        println!("Start: {}, {}", first[0], first[1]);
        println!("End: {}, {}", last[0], last[1]);
    }
    Ok(())
}
