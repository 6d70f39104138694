//! SafePath Server - mission orchestration over the safe path engine

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use safepath_server::{api, config::Config, state::AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(config.log_json.then(|| fmt::layer().json()))
        .with((!config.log_json).then(fmt::layer))
        .with(EnvFilter::from_default_env().add_directive("safepath_server=debug".parse()?))
        .init();

    tracing::info!("Starting SafePath Server...");

    let rules = config.rules();
    rules.validate().context("invalid grid configuration")?;
    tracing::info!(
        grid = rules.grid_rows,
        cell_size_m = rules.cell_size_m,
        buffer_radius = rules.buffer_radius_cells,
        missions_dir = %config.missions_dir.display(),
        detector = config.detector_cmd.as_deref().unwrap_or("<none>"),
        "planner configured"
    );

    let port = config.server_port;
    let state = Arc::new(AppState::new(config));
    let loaded = state
        .reload_missions()
        .context("failed to scan missions directory")?;
    tracing::info!(missions = loaded.len(), "mission index loaded");

    let app = api::routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
