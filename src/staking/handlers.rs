use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};

use crate::{
    auth::AuthUser,
    error::ApiError,
    response::DataResponse,
    state::AppState,
};

use super::dto::{
    CreatePositionRequest, PerformanceData, RewardHistory, SeriesQuery, StakingAsset,
    StakingOverview,
};
use super::services;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/staking/overview", get(get_overview))
        .route("/staking/rewards-history", get(get_rewards_history))
        .route("/staking/performance", get(get_performance))
}

pub fn write_routes() -> Router<AppState> {
    Router::new().route("/staking/assets", get(list_assets).post(create_asset))
}

fn series_days(query: Result<Query<SeriesQuery>, QueryRejection>) -> Result<u32, ApiError> {
    let Query(q) = query.map_err(|e| ApiError::validation(e.body_text()))?;
    services::check_series_days(q.days)
}

#[instrument(skip(state, identity), fields(user_id = %identity.user_id))]
pub async fn get_overview(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<DataResponse<StakingOverview>>, ApiError> {
    let positions = state.positions.list_for_user(identity.user_id).await?;
    let overview = services::overview(&positions, OffsetDateTime::now_utc());
    Ok(Json(DataResponse::ok(overview)))
}

#[instrument(skip(state, identity), fields(user_id = %identity.user_id))]
pub async fn list_assets(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<DataResponse<Vec<StakingAsset>>>, ApiError> {
    let now = OffsetDateTime::now_utc();
    let assets: Vec<StakingAsset> = state
        .positions
        .list_for_user(identity.user_id)
        .await?
        .iter()
        .map(|p| services::to_asset(p, now))
        .collect();
    Ok(Json(DataResponse::ok(assets)))
}

#[instrument(skip(state, identity, payload), fields(user_id = %identity.user_id))]
pub async fn create_asset(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    payload: Result<Json<CreatePositionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DataResponse<StakingAsset>>), ApiError> {
    let Json(payload) = payload?;
    let now = OffsetDateTime::now_utc();
    let new = services::new_position(identity.user_id, payload, now)?;
    let position = state.positions.insert(new).await?;

    info!(position_id = %position.id, symbol = %position.asset_symbol, "position recorded");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::ok(services::to_asset(&position, now))),
    ))
}

#[instrument(skip(state, identity, query), fields(user_id = %identity.user_id))]
pub async fn get_rewards_history(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    query: Result<Query<SeriesQuery>, QueryRejection>,
) -> Result<Json<DataResponse<Vec<RewardHistory>>>, ApiError> {
    let days = series_days(query)?;
    let positions = state.positions.list_for_user(identity.user_id).await?;
    let history = services::rewards_history(&positions, days, OffsetDateTime::now_utc());
    Ok(Json(DataResponse::ok(history)))
}

#[instrument(skip(state, identity, query), fields(user_id = %identity.user_id))]
pub async fn get_performance(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    query: Result<Query<SeriesQuery>, QueryRejection>,
) -> Result<Json<DataResponse<Vec<PerformanceData>>>, ApiError> {
    let days = series_days(query)?;
    let positions = state.positions.list_for_user(identity.user_id).await?;
    let series = services::performance(&positions, days, OffsetDateTime::now_utc());
    Ok(Json(DataResponse::ok(series)))
}
