mod config;
mod shutdown;

use anyhow::Result;
use clap::Parser;
use config::AppConfig;
use mockfab_api::AppState;
use mockfab_core::TelemetryBus;
use mockfab_device::SimulationEngine;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Mock Factory — industrial IoT simulation server.
///
/// Generates fake but realistic telemetry (temperature, pressure,
/// vibration, flow-rate) and streams it over WebSocket so frontends
/// and QA can work against a live data feed without real hardware.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let cfg = AppConfig::load(&args.config)?;

    // The scan-cycle worker pool is an explicit tunable, so the runtime
    // is built by hand instead of #[tokio::main].
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(cfg.engine.worker_threads)
        .enable_all()
        .build()?;

    runtime.block_on(run(cfg))
}

async fn run(cfg: AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.logging.level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!(
        workers = cfg.engine.worker_threads,
        bus_capacity = cfg.bus.capacity,
        "Starting Mock Factory server"
    );

    let bus = TelemetryBus::new(cfg.bus.capacity);
    let engine = Arc::new(SimulationEngine::new(bus));
    let router = mockfab_api::create_router(AppState::new(engine.clone()));

    let addr = format!("{}:{}", cfg.server.host, cfg.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown::wait_for_signal())
        .await?;

    // Best effort: cancel every scan cycle, do not wait for in-flight ticks.
    engine.shutdown().await;
    tracing::info!("Mock Factory server stopped");

    Ok(())
}
