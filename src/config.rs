use anyhow::Context;
use serde::Deserialize;

/// Seven days, in minutes.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 7;
/// One year, in minutes.
pub const MAX_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 365;
pub const DEFAULT_BCRYPT_COST: u32 = 12;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Postgres connection string. When unset the service keeps users and
    /// positions in process memory.
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub bcrypt_cost: u32,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "stakeboard".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "stakeboard-users".into()),
            ttl_minutes: parse_ttl_minutes(std::env::var("JWT_TTL_MINUTES").ok())?,
        };
        let bcrypt_cost = match std::env::var("BCRYPT_COST") {
            Ok(v) => {
                let cost = v.parse::<u32>().context("BCRYPT_COST must be an integer")?;
                anyhow::ensure!((4..=31).contains(&cost), "BCRYPT_COST must be within 4..=31");
                cost
            }
            Err(_) => DEFAULT_BCRYPT_COST,
        };
        let port = std::env::var("APP_PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse::<u16>()
            .context("APP_PORT must be a port number")?;

        Ok(Self {
            database_url,
            jwt,
            bcrypt_cost,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
        })
    }

    /// Configuration used by tests and local tooling: in-memory stores and
    /// the lowest bcrypt cost so hashing stays fast.
    pub fn for_tests() -> Self {
        Self {
            database_url: None,
            jwt: JwtConfig {
                secret: "test-secret".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: DEFAULT_TOKEN_TTL_MINUTES,
            },
            bcrypt_cost: 4,
            host: "127.0.0.1".into(),
            port: 0,
        }
    }
}

fn parse_ttl_minutes(raw: Option<String>) -> anyhow::Result<i64> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_TOKEN_TTL_MINUTES);
    };
    let minutes = raw
        .trim()
        .parse::<i64>()
        .context("JWT_TTL_MINUTES must be an integer")?;
    anyhow::ensure!(
        (1..=MAX_TOKEN_TTL_MINUTES).contains(&minutes),
        "JWT_TTL_MINUTES must be within 1..={}",
        MAX_TOKEN_TTL_MINUTES
    );
    Ok(minutes)
}
