//! Share Router service
//!
//! With NATS_URL set, routes every inbound share request on INBOUND_SUBJECT
//! to FORWARD_SUBJECT and exposes health/ready/metrics endpoints. Without
//! it, routes one JSON request from stdin to stdout and exits.

use anyhow::Result;
use share_router::config::ServiceConfig;
use share_router::dispatch::{ReaderSource, WriterSink};
use share_router::health::{self, AppState};
use share_router::metrics::RouterMetrics;
use share_router::nats::{self, NatsDispatcher};
use share_router::ShareRouter;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first to get log level
    let config = ServiceConfig::from_env()?;

    // Installed once for the whole process; logs go to stderr so local mode
    // keeps stdout for forward requests
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("share_router={}", config.log_level).parse()?)
                .add_directive("async_nats=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "Starting Share Router");

    let router = ShareRouter::new(config.router.clone());

    match config.nats_url.clone() {
        Some(url) => run_service(&config, &url, router).await,
        None => {
            info!("No NATS_URL configured - routing one request from stdin");
            run_local(router).await
        }
    }
}

/// Route a single stdin delivery to stdout
async fn run_local(router: ShareRouter) -> Result<()> {
    let mut source = ReaderSource::new(std::io::stdin().lock());
    let sink = WriterSink::new(std::io::stdout());

    let outcome = router.route(&mut source, &sink).await?;
    if let share_router::RoutingOutcome::Ignore { reason } = outcome {
        info!(%reason, "Nothing forwarded");
    }
    Ok(())
}

async fn run_service(config: &ServiceConfig, url: &str, router: ShareRouter) -> Result<()> {
    let metrics = RouterMetrics::install()?;
    info!("Prometheus metrics initialized");

    let dispatcher = NatsDispatcher::connect(url, config.forward_subject.clone()).await?;
    metrics.set_nats_connected(true);
    info!(url, "Connected to NATS");

    nats::ensure_forward_stream(dispatcher.jetstream(), dispatcher.subject()).await?;

    let app_state = AppState {
        nats: Arc::clone(&dispatcher),
        metrics: metrics.clone(),
    };

    let health_router = health::router(app_state);
    let addr: SocketAddr = ([0, 0, 0, 0], config.http_port).into();

    info!(port = config.http_port, "Starting HTTP server");

    let http_server = axum::serve(tokio::net::TcpListener::bind(addr).await?, health_router);

    tokio::select! {
        result = nats::run_subscription(
            dispatcher.client(),
            &config.inbound_subject,
            &router,
            dispatcher.as_ref(),
            &metrics,
        ) => {
            if let Err(e) = result {
                error!(error = %e, "Inbound subscription error");
            }
        }
        result = http_server => {
            if let Err(e) = result {
                error!(error = %e, "HTTP server error");
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Shutting down share router...");
    dispatcher.close().await;
    metrics.set_nats_connected(false);

    info!("Share router shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
