//! API server entry point.

use std::sync::Arc;

use api::auth::{StaticTokenVerifier, TokenVerifier};
use api::config::Config;
use api::AppState;
use engine::{InMemoryCheckoutProvider, Lifecycle};
use metrics_exporter_prometheus::PrometheusHandle;
use store::{InMemoryStore, MarketStore, PgStore};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

/// Builds the router for a concrete store backend and serves it.
async fn serve<S: MarketStore>(
    store: S,
    config: &Config,
    verifier: Arc<dyn TokenVerifier>,
    metrics_handle: PrometheusHandle,
) {
    let engine = Lifecycle::new(store, InMemoryCheckoutProvider::new());
    let state = Arc::new(AppState::new(engine, verifier));
    let app = api::create_app(state, metrics_handle);

    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}

#[tokio::main]
async fn main() {
    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Load configuration and the token table
    let config = Config::from_env();
    let verifier: Arc<dyn TokenVerifier> = match &config.auth_tokens {
        Some(spec) => Arc::new(StaticTokenVerifier::from_spec(spec)),
        None => Arc::new(StaticTokenVerifier::new()),
    };

    // 4. Pick the store backend and serve
    match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url)
                .await
                .expect("failed to connect to database");
            store.run_migrations().await.expect("migration failed");
            tracing::info!("using PostgreSQL store");
            serve(store, &config, verifier, metrics_handle).await;
        }
        None => {
            tracing::info!("DATABASE_URL not set, using in-memory store");
            serve(InMemoryStore::new(), &config, verifier, metrics_handle).await;
        }
    }
}
