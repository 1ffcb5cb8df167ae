use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use tokio::net::TcpListener;

use locations_service::api::build_router;
use locations_service::cache::SystemClock;
use locations_service::cli::Cli;
use locations_service::config::Config;
use locations_service::error::AppError;
use locations_service::locations::{BranchRules, LocationResolver, Providers, ResolverSettings};
use locations_service::logging::init_logging;
use locations_service::metrics::AppMetrics;
use locations_service::services::{
    core_objects::CoreObjectsClient, recap_alerts::RecapAlertsClient, refinery::RefineryClient,
    url_table::UrlTableClient,
};

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_logging();

    if let Err(err) = run().await {
        tracing::error!("{}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = Config::from_env()
        .and_then(|config| config.apply_cli(&cli))
        .map_err(AppError::Config)?;

    tracing::info!(
        "Starting locations service on {} (cache ttl {}s, offset {})",
        config.bind_addr,
        config.cache_ttl_seconds,
        config.utc_offset
    );

    let metrics = Arc::new(
        AppMetrics::new().map_err(|err| AppError::Config(format!("metrics registry: {}", err)))?,
    );

    let providers = Providers {
        reference_data: Arc::new(CoreObjectsClient::new(config.core_objects_base_url.clone())),
        url_table: Arc::new(UrlTableClient::new(config.url_table_url.clone())),
        branch_data: Arc::new(RefineryClient::new(config.refinery_api_base_url.clone())),
        closure_feed: Arc::new(RecapAlertsClient::new(config.rc_alerts_url.clone())),
    };

    let resolver = Arc::new(LocationResolver::new(
        providers,
        ResolverSettings {
            cache_ttl: config.cache_ttl(),
            utc_offset: config.utc_offset,
            rules: BranchRules::default(),
        },
        Arc::new(SystemClock),
        metrics.clone(),
    ));

    let app = build_router(resolver, metrics);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .map_err(|err| AppError::Config(format!("Failed to bind {}: {}", config.bind_addr, err)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::Network(format!("Server error: {}", err)))?;

    tracing::info!("Locations service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
    }
    tracing::info!("Shutdown signal received");
}
