//! User directory endpoints: signup, profile, role lookup, admin actions.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use common::UserId;
use domain::{NewUser, ProfileUpdate, Role, User};
use engine::PaymentProvider;
use serde::Serialize;
use store::MarketStore;

use crate::AppState;
use crate::auth::authenticate;
use crate::error::ApiError;

#[derive(Serialize)]
pub struct RoleResponse {
    pub role: Role,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Json<Self> {
        Json(SuccessResponse { success: true })
    }
}

/// POST /users — idempotent signup; re-signup returns the existing record.
#[tracing::instrument(skip(state, new))]
pub async fn signup<S: MarketStore, P: PaymentProvider>(
    State(state): State<Arc<AppState<S, P>>>,
    Json(new): Json<NewUser>,
) -> Result<Json<User>, ApiError> {
    let user = state.engine.signup(new).await?;
    Ok(Json(user))
}

/// GET /users/role/{email} — role lookup, defaults to `user`.
#[tracing::instrument(skip(state))]
pub async fn role<S: MarketStore, P: PaymentProvider>(
    State(state): State<Arc<AppState<S, P>>>,
    Path(email): Path<String>,
) -> Result<Json<RoleResponse>, ApiError> {
    let role = state.engine.role_of(&email).await?;
    Ok(Json(RoleResponse { role }))
}

/// GET /users/{email} — the caller's own profile.
#[tracing::instrument(skip(state, headers))]
pub async fn profile<S: MarketStore, P: PaymentProvider>(
    State(state): State<Arc<AppState<S, P>>>,
    headers: HeaderMap,
    Path(email): Path<String>,
) -> Result<Json<User>, ApiError> {
    let identity = authenticate(state.verifier.as_ref(), &headers).await?;
    let user = state.engine.get_profile(&identity, &email).await?;
    Ok(Json(user))
}

/// PATCH /users/{email} — self-service profile update.
#[tracing::instrument(skip(state, headers, update))]
pub async fn update_profile<S: MarketStore, P: PaymentProvider>(
    State(state): State<Arc<AppState<S, P>>>,
    headers: HeaderMap,
    Path(email): Path<String>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let identity = authenticate(state.verifier.as_ref(), &headers).await?;
    state.engine.update_profile(&identity, &email, update).await?;
    Ok(SuccessResponse::ok())
}

/// GET /users — all users. Admin only.
#[tracing::instrument(skip(state, headers))]
pub async fn list<S: MarketStore, P: PaymentProvider>(
    State(state): State<Arc<AppState<S, P>>>,
    headers: HeaderMap,
) -> Result<Json<Vec<User>>, ApiError> {
    let identity = authenticate(state.verifier.as_ref(), &headers).await?;
    let users = state.engine.list_users(&identity).await?;
    Ok(Json(users))
}

/// PATCH /users/fraud/{id} — one-way fraud flag. Admin only.
#[tracing::instrument(skip(state, headers))]
pub async fn flag_fraud<S: MarketStore, P: PaymentProvider>(
    State(state): State<Arc<AppState<S, P>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<SuccessResponse>), ApiError> {
    let identity = authenticate(state.verifier.as_ref(), &headers).await?;
    let user_id = UserId::parse(&id)
        .map_err(|e| ApiError::BadRequest(format!("invalid user id: {e}")))?;
    state.engine.flag_fraud(&identity, user_id).await?;
    Ok((StatusCode::OK, SuccessResponse::ok()))
}
