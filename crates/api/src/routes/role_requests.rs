//! Role elevation request endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use common::RequestId;
use domain::{NewRoleRequest, RoleRequest};
use engine::{Decision, PaymentProvider};
use store::MarketStore;

use crate::AppState;
use crate::auth::authenticate;
use crate::error::ApiError;

fn parse_request_id(id: &str) -> Result<RequestId, ApiError> {
    RequestId::parse(id).map_err(|e| ApiError::BadRequest(format!("invalid request id: {e}")))
}

/// POST /role-requests — open a request. 409 while one is already pending.
#[tracing::instrument(skip(state, new))]
pub async fn create<S: MarketStore, P: PaymentProvider>(
    State(state): State<Arc<AppState<S, P>>>,
    Json(new): Json<NewRoleRequest>,
) -> Result<(StatusCode, Json<RoleRequest>), ApiError> {
    let request = state.engine.request_role(new).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// GET /role-requests — all requests, newest first. Admin only.
#[tracing::instrument(skip(state, headers))]
pub async fn list<S: MarketStore, P: PaymentProvider>(
    State(state): State<Arc<AppState<S, P>>>,
    headers: HeaderMap,
) -> Result<Json<Vec<RoleRequest>>, ApiError> {
    let identity = authenticate(state.verifier.as_ref(), &headers).await?;
    let requests = state.engine.list_role_requests(&identity).await?;
    Ok(Json(requests))
}

/// PATCH /role-requests/accept/{id} — approve and grant the role. Admin only.
#[tracing::instrument(skip(state, headers))]
pub async fn accept<S: MarketStore, P: PaymentProvider>(
    State(state): State<Arc<AppState<S, P>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<RoleRequest>, ApiError> {
    let identity = authenticate(state.verifier.as_ref(), &headers).await?;
    let request = state
        .engine
        .decide_role_request(&identity, parse_request_id(&id)?, Decision::Approve)
        .await?;
    Ok(Json(request))
}

/// PATCH /role-requests/reject/{id} — reject without touching the user. Admin only.
#[tracing::instrument(skip(state, headers))]
pub async fn reject<S: MarketStore, P: PaymentProvider>(
    State(state): State<Arc<AppState<S, P>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<RoleRequest>, ApiError> {
    let identity = authenticate(state.verifier.as_ref(), &headers).await?;
    let request = state
        .engine
        .decide_role_request(&identity, parse_request_id(&id)?, Decision::Reject)
        .await?;
    Ok(Json(request))
}
