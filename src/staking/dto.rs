use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StakingAsset {
    pub id: Uuid,
    pub user_id: Uuid,
    pub asset_name: String,
    pub asset_symbol: String,
    pub amount_staked: f64,
    pub current_value: f64,
    pub apy: f64,
    pub rewards_earned: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub staking_date: OffsetDateTime,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StakingOverview {
    pub total_staked_value: f64,
    pub total_rewards_earned: f64,
    pub average_apy: f64,
    pub total_assets: usize,
    pub performance_change_24h: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RewardHistory {
    pub date: String, // YYYY-MM-DD
    pub amount: f64,
    pub asset_symbol: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceData {
    pub date: String, // YYYY-MM-DD
    pub value: f64,
}

/// Body of `POST /api/staking/assets`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePositionRequest {
    pub asset_name: String,
    pub asset_symbol: String,
    pub amount_staked: f64,
    pub current_value: f64,
    pub apy: f64,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub staking_date: Option<OffsetDateTime>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SeriesQuery {
    #[serde(default = "default_days")]
    pub days: u32,
}
fn default_days() -> u32 { 30 }
