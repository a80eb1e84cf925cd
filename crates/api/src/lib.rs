//! HTTP API server for the marketplace backend.
//!
//! Exposes the lifecycle engine over REST with structured logging
//! (tracing) and Prometheus metrics. Token verification is delegated to
//! the [`auth::TokenVerifier`] collaborator; the handlers only ever see a
//! verified subject email.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, post};
use engine::{Lifecycle, PaymentProvider};
use metrics_exporter_prometheus::PrometheusHandle;
use store::MarketStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use auth::TokenVerifier;

/// Shared application state accessible from all handlers.
pub struct AppState<S: MarketStore, P: PaymentProvider> {
    pub engine: Lifecycle<S, P>,
    pub verifier: Arc<dyn TokenVerifier>,
}

impl<S: MarketStore, P: PaymentProvider> AppState<S, P> {
    pub fn new(engine: Lifecycle<S, P>, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { engine, verifier }
    }
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: MarketStore, P: PaymentProvider + 'static>(
    state: Arc<AppState<S, P>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        // users
        .route("/users", post(routes::users::signup::<S, P>))
        .route("/users", get(routes::users::list::<S, P>))
        .route("/users/role/{email}", get(routes::users::role::<S, P>))
        .route("/users/fraud/{id}", patch(routes::users::flag_fraud::<S, P>))
        .route("/users/{email}", get(routes::users::profile::<S, P>))
        .route("/users/{email}", patch(routes::users::update_profile::<S, P>))
        // orders
        .route("/orders", post(routes::orders::create::<S, P>))
        .route("/orders/user/{email}", get(routes::orders::for_customer::<S, P>))
        .route("/orders/chef/{chef_id}", get(routes::orders::for_chef::<S, P>))
        .route("/orders/accept/{id}", patch(routes::orders::accept::<S, P>))
        .route("/orders/cancel/{id}", patch(routes::orders::cancel::<S, P>))
        .route("/orders/deliver/{id}", patch(routes::orders::deliver::<S, P>))
        // payments
        .route("/payments", post(routes::payments::record::<S, P>))
        .route(
            "/create-checkout-session",
            post(routes::payments::create_checkout_session::<S, P>),
        )
        // role requests
        .route("/role-requests", post(routes::role_requests::create::<S, P>))
        .route("/role-requests", get(routes::role_requests::list::<S, P>))
        .route(
            "/role-requests/accept/{id}",
            patch(routes::role_requests::accept::<S, P>),
        )
        .route(
            "/role-requests/reject/{id}",
            patch(routes::role_requests::reject::<S, P>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
