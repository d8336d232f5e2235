/*
 * BaseSwap - headless client for the Base Sepolia swap pool
 * Main entry point for the application
 */

use anyhow::Context;
use baseswap::{api, config::Config, service::{self, SwapApp}};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    info!("Starting BaseSwap client");

    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!("Configuration loaded successfully");

    let (app, watcher) = SwapApp::new(&config)
        .await
        .with_context(|| format!("failed to reach RPC endpoint {}", config.chain.rpc_url))?;

    let api_state = api::ApiState::new(config.clone(), app);
    tokio::spawn(service::run_refresh_loop(api_state.app.clone(), watcher));

    info!("Starting API server on {}:{}", config.server.host, config.server.port);

    let rocket = api::create_rocket(api_state);
    rocket.launch().await?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
                    format!("baseswap={level}").into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
