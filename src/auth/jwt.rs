use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::Serialize;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{
    auth::{claims::Claims, repo_types::User},
    config::{JwtConfig, MAX_TOKEN_TTL_MINUTES},
    error::ApiError,
    state::AppState,
};

/// Who a valid session token belongs to, and until when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
    pub username: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

/// Signing and verification keys plus the claims every token must carry.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        let ttl_minutes = cfg.ttl_minutes.clamp(0, MAX_TOKEN_TTL_MINUTES) as u64;
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::from_secs(ttl_minutes * 60),
        }
    }

    /// Sign a token for `user` that expires `ttl` from now.
    pub fn issue(&self, user: &User) -> anyhow::Result<String> {
        self.issue_at(user, OffsetDateTime::now_utc())
    }

    pub fn issue_at(&self, user: &User, issued_at: OffsetDateTime) -> anyhow::Result<String> {
        let exp = issued_at + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            iat: issued_at.unix_timestamp().max(0) as usize,
            exp: exp.unix_timestamp().max(0) as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = self.sign(&claims)?;
        debug!(user_id = %user.id, "jwt signed");
        Ok(token)
    }

    pub fn sign(&self, claims: &Claims) -> anyhow::Result<String> {
        Ok(encode(&Header::new(Algorithm::HS256), claims, &self.encoding)?)
    }

    /// Check signature, issuer, audience and expiry. Expiry is exact, with
    /// no leeway.
    pub fn validate(&self, token: &str) -> Result<Identity, ApiError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => ApiError::TokenExpired,
                _ => ApiError::TokenInvalid,
            }
        })?;
        let claims = data.claims;
        let expires_at = OffsetDateTime::from_unix_timestamp(claims.exp as i64)
            .map_err(|_| ApiError::TokenInvalid)?;
        debug!(user_id = %claims.sub, "jwt verified");

        Ok(Identity {
            user_id: claims.sub,
            email: claims.email,
            username: claims.username,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{JwtConfig, DEFAULT_TOKEN_TTL_MINUTES};

    fn make_keys(secret: &str, issuer: &str, audience: &str) -> JwtKeys {
        JwtKeys::from_config(&JwtConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            ttl_minutes: DEFAULT_TOKEN_TTL_MINUTES,
        })
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "a@x.com".into(),
            username: "a".into(),
            password_hash: String::new(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn issue_and_validate() {
        let keys = make_keys("dev-secret", "test-issuer", "test-aud");
        let user = user();
        let token = keys.issue(&user).expect("issue");
        let identity = keys.validate(&token).expect("validate");
        assert_eq!(identity.user_id, user.id);
        assert_eq!(identity.email, "a@x.com");
        assert_eq!(identity.username, "a");
    }

    #[test]
    fn token_expires_seven_days_after_issue() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let issued_at = OffsetDateTime::now_utc().replace_nanosecond(0).unwrap();
        let token = keys.issue_at(&user(), issued_at).unwrap();
        let identity = keys.validate(&token).unwrap();
        assert_eq!(identity.expires_at - issued_at, TimeDuration::days(7));
    }

    #[test]
    fn oversized_ttl_is_capped_at_a_year() {
        let keys = JwtKeys::from_config(&JwtConfig {
            secret: "dev-secret".into(),
            issuer: "iss".into(),
            audience: "aud".into(),
            ttl_minutes: i64::MAX,
        });
        assert_eq!(keys.ttl.as_secs(), (MAX_TOKEN_TTL_MINUTES * 60) as u64);
        let token = keys.issue(&user()).unwrap();
        assert!(keys.validate(&token).is_ok());
    }

    #[test]
    fn validate_is_idempotent() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let token = keys.issue(&user()).unwrap();
        let first = keys.validate(&token).unwrap();
        let second = keys.validate(&token).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn past_expiry_is_token_expired() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let now = OffsetDateTime::now_utc().unix_timestamp() as usize;
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "a@x.com".into(),
            username: "a".into(),
            iat: now - 7200,
            exp: now - 3600,
            iss: "iss".into(),
            aud: "aud".into(),
        };
        let token = keys.sign(&claims).unwrap();
        assert!(matches!(keys.validate(&token), Err(ApiError::TokenExpired)));
    }

    #[test]
    fn issued_long_ago_is_token_expired() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let issued_at = OffsetDateTime::now_utc() - TimeDuration::days(8);
        let token = keys.issue_at(&user(), issued_at).unwrap();
        assert!(matches!(keys.validate(&token), Err(ApiError::TokenExpired)));
    }

    #[test]
    fn tampered_signature_is_token_invalid() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let token = keys.issue(&user()).unwrap();
        let (head, sig) = token.rsplit_once('.').unwrap();
        let flipped = if sig.starts_with('A') { "B" } else { "A" };
        let tampered = format!("{}.{}{}", head, flipped, &sig[1..]);
        assert!(matches!(keys.validate(&tampered), Err(ApiError::TokenInvalid)));
    }

    #[test]
    fn other_secret_is_token_invalid() {
        let token = make_keys("secret-one", "iss", "aud").issue(&user()).unwrap();
        let other = make_keys("secret-two", "iss", "aud");
        assert!(matches!(other.validate(&token), Err(ApiError::TokenInvalid)));
    }

    #[test]
    fn wrong_issuer_or_audience_is_token_invalid() {
        let good = make_keys("same-secret", "good-iss", "good-aud");
        let bad = make_keys("same-secret", "bad-iss", "bad-aud");
        let token = good.issue(&user()).unwrap();
        assert!(matches!(bad.validate(&token), Err(ApiError::TokenInvalid)));
    }

    #[test]
    fn garbage_is_token_invalid() {
        let keys = make_keys("dev-secret", "iss", "aud");
        assert!(matches!(keys.validate("not.a.jwt"), Err(ApiError::TokenInvalid)));
        assert!(matches!(keys.validate(""), Err(ApiError::TokenInvalid)));
    }
}
