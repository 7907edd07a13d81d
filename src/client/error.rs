use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Not logged in")]
    LoggedOut,

    /// The server rejected the session; it has been cleared locally and the
    /// user needs to log in again.
    #[error("Session expired or invalid - please log in again")]
    Unauthorized,

    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Session storage error: {0}")]
    Storage(#[from] anyhow::Error),
}
