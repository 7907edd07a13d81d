//! Caller-side session management for the dashboard API.
//!
//! - `ClientSession`: token + username, persisted through a `SessionStore`
//! - `DashboardClient`: attaches the bearer token and forces logout on 401

pub mod api;
pub mod error;
pub mod session;

pub use api::DashboardClient;
pub use error::ClientError;
pub use session::{ClientSession, FileSessionStore, MemorySessionStore, SessionData, SessionStore};
