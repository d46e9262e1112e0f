use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod cache;
mod config;
mod error;
mod faustv1;
mod faustv2;
mod metrics;
mod scoreboard;
mod upstream;

#[cfg(test)]
mod testutil;

use cache::SystemClock;
use config::{Config, Protocol};
use faustv1::FaustV1Exporter;
use faustv2::FaustV2Exporter;
use metrics::AppState;
use scoreboard::Exporter;
use upstream::{HttpTransport, Transport};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(
        Duration::from_secs(config.http_timeout_secs),
        config.insecure_skip_verify,
    )?);
    let clock = Arc::new(SystemClock);

    let exporter: Arc<dyn Exporter> = match &config.protocol {
        Protocol::Faustv1(args) => {
            let endpoints = args.endpoints()?;
            info!(
                "faustv1: scoreboard={} status={}",
                endpoints.scoreboard_url, endpoints.status_url
            );
            Arc::new(FaustV1Exporter::new(endpoints, transport, clock))
        }
        Protocol::Faustv2(args) => {
            let endpoints = args.endpoints()?;
            info!(
                "faustv2: current={} round={} teams={}",
                endpoints.current_url, endpoints.round_url, endpoints.teams_url
            );
            Arc::new(FaustV2Exporter::new(endpoints, transport, clock))
        }
    };

    let app = metrics::router(AppState { exporter });
    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("invalid listen address {}", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on http://{}/metrics", addr);

    // Serve scrapes until shutdown
    axum::serve(listener, app).await?;

    Ok(())
}
