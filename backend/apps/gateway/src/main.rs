//! Edge Gateway Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but request-level
//! errors are rendered by each crate's error types.

mod app;
mod config;

use axum::Router;
use platform::cache::MemoryEdgeCache;
use platform::clock::SystemClock;
use platform::kv::KvBinding;
use platform::tasks::BackgroundTasks;
use platform::upstream::HttpUpstream;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::{Infra, build_app, purge_expired};
use crate::config::GatewayConfig;

/// How often expired in-memory entries are swept
const PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "gateway=info,admission=info,oauth=info,platform=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GatewayConfig::from_env()?;

    tracing::info!(
        admin_prefix = %config.admission.admin_path_prefix,
        flash_sale_prefix = %config.admission.flash_sale_path_prefix,
        flash_sale_max_requests = config.admission.flash_sale_rate_limit.max_requests,
        flash_sale_window_secs = config.admission.flash_sale_rate_limit.window_secs(),
        "Admission guards configured"
    );

    let clock = SystemClock::shared();
    let infra = Infra {
        kv: KvBinding::from_kind(config.kv_binding, clock.clone()),
        cache: MemoryEdgeCache::with_capacity(clock.clone(), config.edge_cache_capacity),
        clock,
        tasks: BackgroundTasks::new(),
    };

    // Periodic sweep of the in-memory stores; reads already ignore
    // expired entries, this only bounds memory
    let sweeper = {
        let infra = infra.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(PURGE_INTERVAL);
            loop {
                interval.tick().await;
                purge_expired(&infra);
            }
        })
    };

    let origin = HttpUpstream::new("origin", &config.origin_url)?;
    let backend = HttpUpstream::new("backend", &config.backend_api_url)?;
    let tasks = infra.tasks.clone();

    // Build router
    let app: Router = build_app(&config, infra, origin, backend)?.layer(TraceLayer::new_for_http());

    // Start server
    let addr = config.listen_addr;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    sweeper.abort();
    tasks.drain().await;
    tracing::info!("Gateway stopped");

    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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

    tracing::info!("Shutdown signal received; draining connections");
}
