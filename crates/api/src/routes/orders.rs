//! Order lifecycle endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use common::OrderId;
use domain::{ChefId, Order, OrderDraft};
use engine::PaymentProvider;
use store::MarketStore;

use crate::AppState;
use crate::auth::authenticate;
use crate::error::ApiError;
use crate::routes::users::SuccessResponse;

fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    OrderId::parse(id).map_err(|e| ApiError::BadRequest(format!("invalid order id: {e}")))
}

/// POST /orders — place an order. 409 on duplicate, 403 on fraud customer.
#[tracing::instrument(skip(state, draft))]
pub async fn create<S: MarketStore, P: PaymentProvider>(
    State(state): State<Arc<AppState<S, P>>>,
    Json(draft): Json<OrderDraft>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let order = state.engine.place_order(draft).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /orders/user/{email} — the caller's order history, newest first.
#[tracing::instrument(skip(state, headers))]
pub async fn for_customer<S: MarketStore, P: PaymentProvider>(
    State(state): State<Arc<AppState<S, P>>>,
    headers: HeaderMap,
    Path(email): Path<String>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let identity = authenticate(state.verifier.as_ref(), &headers).await?;
    let orders = state.engine.orders_for_customer(&identity, &email).await?;
    Ok(Json(orders))
}

/// GET /orders/chef/{chef_id} — a chef's order queue, newest first.
#[tracing::instrument(skip(state))]
pub async fn for_chef<S: MarketStore, P: PaymentProvider>(
    State(state): State<Arc<AppState<S, P>>>,
    Path(chef_id): Path<String>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let chef_id =
        ChefId::new(chef_id).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let orders = state.engine.orders_for_chef(&chef_id).await?;
    Ok(Json(orders))
}

/// PATCH /orders/accept/{id} — conditional on fulfillment = pending.
#[tracing::instrument(skip(state))]
pub async fn accept<S: MarketStore, P: PaymentProvider>(
    State(state): State<Arc<AppState<S, P>>>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.engine.accept_order(parse_order_id(&id)?).await?;
    Ok(SuccessResponse::ok())
}

/// PATCH /orders/cancel/{id} — conditional on fulfillment = pending.
#[tracing::instrument(skip(state))]
pub async fn cancel<S: MarketStore, P: PaymentProvider>(
    State(state): State<Arc<AppState<S, P>>>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.engine.cancel_order(parse_order_id(&id)?).await?;
    Ok(SuccessResponse::ok())
}

/// PATCH /orders/deliver/{id} — conditional on payment = paid; 400 otherwise.
#[tracing::instrument(skip(state))]
pub async fn deliver<S: MarketStore, P: PaymentProvider>(
    State(state): State<Arc<AppState<S, P>>>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.engine.deliver_order(parse_order_id(&id)?).await?;
    Ok(SuccessResponse::ok())
}
