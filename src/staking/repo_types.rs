use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// A staking position as stored. Rewards are derived at read time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Position {
    pub id: Uuid,
    pub user_id: Uuid,
    pub asset_name: String,
    pub asset_symbol: String,
    pub amount_staked: f64,
    pub current_value: f64,
    pub apy: f64, // percent
    pub staking_date: OffsetDateTime,
    pub logo_url: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewPosition {
    pub user_id: Uuid,
    pub asset_name: String,
    pub asset_symbol: String,
    pub amount_staked: f64,
    pub current_value: f64,
    pub apy: f64,
    pub staking_date: OffsetDateTime,
    pub logo_url: Option<String>,
}
