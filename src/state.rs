use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::{
    repo::{MemoryUserStore, PgUserStore, UserStore},
    JwtKeys,
};
use crate::config::AppConfig;
use crate::db;
use crate::staking::repo::{MemoryPositionStore, PgPositionStore, PositionStore};

/// Shared per-request context. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub positions: Arc<dyn PositionStore>,
    pub keys: JwtKeys,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let Some(url) = config.database_url.clone() else {
            warn!("DATABASE_URL not set; users and positions are kept in memory");
            return Ok(Self::in_memory(config));
        };

        let pool = db::connect(&url).await?;
        db::migrate(&pool).await?;
        info!("database ready");

        let users = Arc::new(PgUserStore::new(pool.clone())) as Arc<dyn UserStore>;
        let positions = Arc::new(PgPositionStore::new(pool)) as Arc<dyn PositionStore>;
        Ok(Self::from_parts(Arc::new(config), users, positions))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserStore>,
        positions: Arc<dyn PositionStore>,
    ) -> Self {
        let keys = JwtKeys::from_config(&config.jwt);
        Self {
            config,
            users,
            positions,
            keys,
        }
    }

    pub fn in_memory(config: AppConfig) -> Self {
        Self::from_parts(
            Arc::new(config),
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemoryPositionStore::new()),
        )
    }

    /// In-memory state with test settings.
    pub fn fake() -> Self {
        Self::in_memory(AppConfig::for_tests())
    }
}
