use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tp_core::catalog::Catalog;
use tp_core::planning_service::PlanningService;
use tp_server::app::{router, AppState};
use tp_server::cli_args::Cli;
use tracing::{event, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry().with(fmt::layer()).with(EnvFilter::from_default_env()).init();

    let catalog = Catalog::load_from_file(&cli.catalog_path).with_context(|| format!("loading catalog {}", cli.catalog_path.display()))?;
    let service = PlanningService::new(Arc::new(catalog), cli.planner_configuration());
    let app = router(AppState::new(service), cli.static_dir.as_deref());

    let listener = tokio::net::TcpListener::bind(cli.bind_address)
        .await
        .with_context(|| format!("binding {}", cli.bind_address))?;
    event!(Level::INFO, "listening on http://{}", cli.bind_address);

    axum::serve(listener, app.into_make_service()).await.context("server stopped")?;
    Ok(())
}
