//! Payment endpoints: checkout session creation and payment recording.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use common::OrderId;
use domain::Payment;
use engine::{CheckoutSession, PaymentProvider};
use serde::Deserialize;
use store::MarketStore;

use crate::AppState;
use crate::auth::authenticate;
use crate::error::ApiError;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckoutRequest {
    pub order_id: OrderId,
    pub amount_cents: i64,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaymentRequest {
    pub order_id: OrderId,
    pub amount_cents: i64,
}

/// POST /create-checkout-session — provider call only, no state change.
#[tracing::instrument(skip(state, req))]
pub async fn create_checkout_session<S: MarketStore, P: PaymentProvider>(
    State(state): State<Arc<AppState<S, P>>>,
    Json(req): Json<CheckoutRequest>,
) -> Result<Json<CheckoutSession>, ApiError> {
    let session = state
        .engine
        .create_checkout_session(req.order_id, req.amount_cents)
        .await?;
    Ok(Json(session))
}

/// POST /payments — record a settled payment and mark the order paid.
/// Requires a verified token; the payment itself is not owner-scoped.
#[tracing::instrument(skip(state, headers, req))]
pub async fn record<S: MarketStore, P: PaymentProvider>(
    State(state): State<Arc<AppState<S, P>>>,
    headers: HeaderMap,
    Json(req): Json<PaymentRequest>,
) -> Result<(StatusCode, Json<Payment>), ApiError> {
    authenticate(state.verifier.as_ref(), &headers).await?;
    let payment = state
        .engine
        .record_payment(req.order_id, req.amount_cents)
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}
