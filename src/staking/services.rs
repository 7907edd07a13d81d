//! Portfolio aggregation over recorded positions.
//!
//! Everything here is a pure function of the positions and the current time.
//! Rewards are simple interest: a position earns `apy` percent of its staked
//! amount per 365 days. The performance series instead walks `current_value`
//! back at the same rate.

use time::{macros::format_description, Date, Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{
    error::ApiError,
    staking::{
        dto::{CreatePositionRequest, PerformanceData, RewardHistory, StakingAsset, StakingOverview},
        repo_types::{NewPosition, Position},
    },
};

pub const MAX_SERIES_DAYS: u32 = 365;
/// Upper bound for amounts and values, keeping portfolio sums finite.
pub const MAX_POSITION_VALUE: f64 = 1e15;
/// Upper bound for `apy`, in percent.
pub const MAX_APY: f64 = 1e6;

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn format_day(date: Date) -> String {
    // The format has no fallible components.
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_default()
}

/// Days from `days` ago up to and including yesterday.
fn series_dates(days: u32, today: Date) -> impl Iterator<Item = Date> {
    (0..days as i64).map(move |i| today - Duration::days(days as i64 - i))
}

fn daily_reward(p: &Position) -> f64 {
    p.amount_staked * p.apy / 100.0 / 365.0
}

fn daily_value_accrual(p: &Position) -> f64 {
    p.current_value * p.apy / 100.0 / 365.0
}

fn staked_by(p: &Position, date: Date) -> bool {
    p.staking_date.date() <= date
}

pub fn to_asset(p: &Position, now: OffsetDateTime) -> StakingAsset {
    let days_staked = (now - p.staking_date).whole_days().max(0) as f64;
    StakingAsset {
        id: p.id,
        user_id: p.user_id,
        asset_name: p.asset_name.clone(),
        asset_symbol: p.asset_symbol.clone(),
        amount_staked: p.amount_staked,
        current_value: p.current_value,
        apy: p.apy,
        rewards_earned: round2(p.amount_staked * (p.apy / 100.0) * (days_staked / 365.0)),
        staking_date: p.staking_date,
        logo_url: p.logo_url.clone(),
    }
}

fn portfolio_value_on(positions: &[Position], date: Date, today: Date) -> f64 {
    let days_back = (today - date).whole_days().max(0) as f64;
    positions
        .iter()
        .filter(|p| staked_by(p, date))
        .map(|p| (p.current_value - daily_value_accrual(p) * days_back).max(0.0))
        .sum()
}

pub fn overview(positions: &[Position], now: OffsetDateTime) -> StakingOverview {
    let assets: Vec<StakingAsset> = positions.iter().map(|p| to_asset(p, now)).collect();
    let total_staked: f64 = assets.iter().map(|a| a.current_value).sum();
    let total_rewards: f64 = assets.iter().map(|a| a.rewards_earned).sum();
    let average_apy = if assets.is_empty() {
        0.0
    } else {
        assets.iter().map(|a| a.apy).sum::<f64>() / assets.len() as f64
    };

    let today = now.date();
    let before = portfolio_value_on(positions, today - Duration::days(2), today);
    let after = portfolio_value_on(positions, today - Duration::days(1), today);
    let change = if before > 0.0 {
        (after - before) / before * 100.0
    } else {
        0.0
    };

    StakingOverview {
        total_staked_value: round2(total_staked),
        total_rewards_earned: round2(total_rewards),
        average_apy: round2(average_apy),
        total_assets: assets.len(),
        performance_change_24h: round2(change),
    }
}

/// One entry per day: the day's total accrual and its largest contributor.
pub fn rewards_history(positions: &[Position], days: u32, now: OffsetDateTime) -> Vec<RewardHistory> {
    series_dates(days, now.date())
        .map(|date| {
            let mut total = 0.0;
            let mut top: Option<(&str, f64)> = None;
            for p in positions.iter().filter(|p| staked_by(p, date)) {
                let amount = daily_reward(p);
                total += amount;
                if top.map_or(true, |(_, best)| amount > best) {
                    top = Some((p.asset_symbol.as_str(), amount));
                }
            }
            RewardHistory {
                date: format_day(date),
                amount: round2(total),
                asset_symbol: top.map_or_else(|| "-".to_string(), |(s, _)| s.to_string()),
            }
        })
        .collect()
}

pub fn performance(positions: &[Position], days: u32, now: OffsetDateTime) -> Vec<PerformanceData> {
    let today = now.date();
    series_dates(days, today)
        .map(|date| PerformanceData {
            date: format_day(date),
            value: round2(portfolio_value_on(positions, date, today)),
        })
        .collect()
}

pub fn check_series_days(days: u32) -> Result<u32, ApiError> {
    if days == 0 || days > MAX_SERIES_DAYS {
        return Err(ApiError::validation(format!(
            "days must be between 1 and {}",
            MAX_SERIES_DAYS
        )));
    }
    Ok(days)
}

pub fn new_position(
    user_id: Uuid,
    req: CreatePositionRequest,
    now: OffsetDateTime,
) -> Result<NewPosition, ApiError> {
    let asset_name = req.asset_name.trim().to_string();
    let asset_symbol = req.asset_symbol.trim().to_uppercase();
    if asset_name.is_empty() || asset_symbol.is_empty() {
        return Err(ApiError::validation("asset_name and asset_symbol are required"));
    }
    for (field, v, max) in [
        ("amount_staked", req.amount_staked, MAX_POSITION_VALUE),
        ("current_value", req.current_value, MAX_POSITION_VALUE),
        ("apy", req.apy, MAX_APY),
    ] {
        if !v.is_finite() || v < 0.0 {
            return Err(ApiError::validation(format!(
                "{} must be a non-negative number",
                field
            )));
        }
        if v > max {
            return Err(ApiError::validation(format!("{} must not exceed {}", field, max)));
        }
    }
    let staking_date = req.staking_date.unwrap_or(now);
    if staking_date > now {
        return Err(ApiError::validation("staking_date cannot be in the future"));
    }

    Ok(NewPosition {
        user_id,
        asset_name,
        asset_symbol,
        amount_staked: req.amount_staked,
        current_value: req.current_value,
        apy: req.apy,
        staking_date,
        logo_url: req.logo_url.filter(|u| !u.trim().is_empty()),
    })
}
