//! PVZ reception service.
//!
//! Serves three listeners:
//!
//! - the public API on `PVZ_PORT`
//! - the unauthenticated export listener on `PVZ_EXPORT_PORT`
//! - Prometheus metrics on `PVZ_METRICS_PORT`
//!
//! Migrations are not run on startup. Use `pvz-cli migrate`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::future::IntoFuture;
use std::sync::Arc;

use sentry::integrations::tracing as sentry_tracing;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pvz_server::auth::TokenIssuer;
use pvz_server::config::{LogFormat, PvzConfig};
use pvz_server::db::{self, PgStore};
use pvz_server::metrics::MetricsServer;
use pvz_server::routes;
use pvz_server::state::AppState;

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &PvzConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            traces_sample_rate: config.sentry_traces_sample_rate,
            attach_stacktrace: true,
            send_default_pii: false,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pvz_server=info,pvz_core=info,tower_http=debug".into());

    let json_layer = (format == LogFormat::Json)
        .then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (format == LogFormat::Text).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = PvzConfig::from_env()?;

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing(config.log_format);

    let mut metrics = MetricsServer::new(config.metrics_addr());
    metrics.start()?;

    let pool = db::create_pool(&config.database_url, config.db_max_connections).await?;
    tracing::info!("Database pool created");

    let tokens = TokenIssuer::new(
        &config.jwt_secret,
        chrono::Duration::hours(config.jwt_ttl_hours),
    );
    let state = AppState::new(Arc::new(PgStore::new(pool)), tokens);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    let api_listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
    tracing::info!("api listening on http://{}", config.socket_addr());
    let api = axum::serve(api_listener, routes::app(state.clone()))
        .with_graceful_shutdown(wait_for(shutdown_rx.clone()))
        .into_future();

    let export_listener = tokio::net::TcpListener::bind(config.export_addr()).await?;
    tracing::info!("export listening on http://{}", config.export_addr());
    let export = axum::serve(export_listener, routes::export_app(state))
        .with_graceful_shutdown(wait_for(shutdown_rx.clone()))
        .into_future();

    let metrics = metrics.serve(wait_for(shutdown_rx));

    let (api, export, metrics) = tokio::join!(api, export, metrics);
    api?;
    export?;
    metrics?;

    tracing::info!("shutdown complete");
    Ok(())
}

/// Resolve once the shutdown flag flips.
async fn wait_for(mut rx: watch::Receiver<bool>) {
    // Closed channel counts as shutdown
    let _ = rx.wait_for(|stop| *stop).await;
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
