use anyhow::{Context, Result, bail};
use docsum::{api, config, logging, pipeline::SummaryService};
use std::{net::Ipv4Addr, ops::RangeInclusive, sync::Arc};
use tokio::net::TcpListener;

const FALLBACK_PORTS: RangeInclusive<u16> = 4100..=4199;

#[tokio::main]
async fn main() -> Result<()> {
    config::init_config();
    logging::init_tracing();
    let config = config::get_config();
    config.log_loaded();

    let service =
        SummaryService::from_config(config).context("failed to initialize summary service")?;
    let app = api::create_router_with_limit(Arc::new(service), config.max_upload_bytes);

    let (listener, port) = bind_listener(config.server_port).await?;
    tracing::info!(port, max_upload_bytes = config.max_upload_bytes, "Docsum listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated unexpectedly")?;
    tracing::info!("Docsum stopped");
    Ok(())
}

/// Bind the configured port, or the first free port in the fallback range.
async fn bind_listener(configured: Option<u16>) -> Result<(TcpListener, u16)> {
    if let Some(port) = configured {
        let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
            .await
            .with_context(|| format!("failed to bind SERVER_PORT {port}"))?;
        return Ok((listener, port));
    }

    for port in FALLBACK_PORTS {
        match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await {
            Ok(listener) => return Ok((listener, port)),
            Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
                tracing::debug!(port, "Port already in use; trying next");
            }
            Err(err) => return Err(err).with_context(|| format!("failed to bind port {port}")),
        }
    }
    bail!(
        "no free port in {}-{}",
        FALLBACK_PORTS.start(),
        FALLBACK_PORTS.end()
    )
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
