use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the credential store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,                   // unique user ID
    pub email: String,              // unique, lowercased
    pub username: String,           // display name
    #[serde(skip_serializing)]
    pub password_hash: String,      // bcrypt hash, not exposed in JSON
    pub created_at: OffsetDateTime, // creation timestamp
}

/// Fields needed to insert a user; id and timestamp are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
}
