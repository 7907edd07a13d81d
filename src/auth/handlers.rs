use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, SignupRequest},
        extractors::AuthUser,
        services,
    },
    error::ApiError,
    response::DataResponse,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(payload) = payload?;
    let user = services::register(
        state.users.as_ref(),
        &payload.email,
        &payload.username,
        &payload.password,
        state.config.bcrypt_cost,
    )
    .await?;

    let token = state.keys.issue(&user).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        ApiError::Internal(e)
    })?;

    info!(user_id = %user.id, "signup complete");
    Ok(Json(AuthResponse::new(token, user.username)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(payload) = payload?;
    let user = services::verify(
        state.users.as_ref(),
        &payload.email,
        &payload.password,
        state.config.bcrypt_cost,
    )
    .await?;

    let token = state.keys.issue(&user).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        ApiError::Internal(e)
    })?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(AuthResponse::new(token, user.username)))
}

#[instrument(skip(state, session))]
pub async fn get_me(
    State(state): State<AppState>,
    session: AuthUser,
) -> Result<Json<DataResponse<PublicUser>>, ApiError> {
    let AuthUser(identity) = session;
    // A token can outlive its user only if the store was reset.
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or(ApiError::TokenInvalid)?;

    Ok(Json(DataResponse::ok(PublicUser {
        id: user.id,
        email: user.email,
        username: user.username,
        created_at: user.created_at,
    })))
}
