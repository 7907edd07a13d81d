use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::staking::repo_types::{NewPosition, Position};

#[async_trait]
pub trait PositionStore: Send + Sync {
    /// Positions of one user, oldest staking date first.
    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Position>>;
    async fn insert(&self, position: NewPosition) -> anyhow::Result<Position>;
}

#[derive(Clone)]
pub struct PgPositionStore {
    db: PgPool,
}

impl PgPositionStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PositionStore for PgPositionStore {
    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Position>> {
        let rows = sqlx::query_as::<_, Position>(
            r#"
            SELECT id, user_id, asset_name, asset_symbol, amount_staked, current_value,
                   apy, staking_date, logo_url, created_at
            FROM staking_positions
            WHERE user_id = $1
            ORDER BY staking_date ASC, created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list staking positions")?;
        Ok(rows)
    }

    async fn insert(&self, p: NewPosition) -> anyhow::Result<Position> {
        let row = sqlx::query_as::<_, Position>(
            r#"
            INSERT INTO staking_positions
                (id, user_id, asset_name, asset_symbol, amount_staked, current_value,
                 apy, staking_date, logo_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, user_id, asset_name, asset_symbol, amount_staked, current_value,
                      apy, staking_date, logo_url, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(p.user_id)
        .bind(&p.asset_name)
        .bind(&p.asset_symbol)
        .bind(p.amount_staked)
        .bind(p.current_value)
        .bind(p.apy)
        .bind(p.staking_date)
        .bind(&p.logo_url)
        .fetch_one(&self.db)
        .await
        .context("insert staking position")?;
        Ok(row)
    }
}

#[derive(Default)]
pub struct MemoryPositionStore {
    positions: RwLock<HashMap<Uuid, Vec<Position>>>,
}

impl MemoryPositionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PositionStore for MemoryPositionStore {
    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Position>> {
        let mut rows = self
            .positions
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default();
        rows.sort_by_key(|p| (p.staking_date, p.created_at));
        Ok(rows)
    }

    async fn insert(&self, p: NewPosition) -> anyhow::Result<Position> {
        let row = Position {
            id: Uuid::new_v4(),
            user_id: p.user_id,
            asset_name: p.asset_name,
            asset_symbol: p.asset_symbol,
            amount_staked: p.amount_staked,
            current_value: p.current_value,
            apy: p.apy,
            staking_date: p.staking_date,
            logo_url: p.logo_url,
            created_at: OffsetDateTime::now_utc(),
        };
        self.positions
            .write()
            .await
            .entry(row.user_id)
            .or_default()
            .push(row.clone());
        Ok(row)
    }
}
