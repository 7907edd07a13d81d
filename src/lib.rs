//! Staking-portfolio dashboard backend: bcrypt credentials, stateless JWT
//! sessions, and per-user staking aggregates behind `/api`, plus a client
//! that manages the session on the caller's side.

pub mod app;
pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod response;
pub mod staking;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
