//! HTTP client for the dashboard API.
//!
//! Owns the caller's `ClientSession`: a successful signup or login stores the
//! token, every protected call sends it as a bearer header, and any 401 wipes
//! it so the caller can send the user back to login.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::{
    auth::dto::{AuthResponse, LoginRequest, PublicUser, SignupRequest},
    error::ErrorBody,
    response::DataResponse,
    staking::dto::{
        CreatePositionRequest, PerformanceData, RewardHistory, StakingAsset, StakingOverview,
    },
};

use super::{ClientError, ClientSession, SessionData};

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

pub struct DashboardClient {
    http: Client,
    base_url: String,
    session: ClientSession,
}

impl DashboardClient {
    /// `base_url` is the API root, e.g. `http://localhost:8080/api`.
    pub fn new(base_url: impl Into<String>, session: ClientSession) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &ClientSession {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn signup(
        &mut self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<String, ClientError> {
        let body = SignupRequest {
            email: email.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        };
        let req = self.http.post(self.url("/auth/signup")).json(&body);
        self.authenticate(req).await
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<String, ClientError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let req = self.http.post(self.url("/auth/login")).json(&body);
        self.authenticate(req).await
    }

    pub fn logout(&mut self) -> Result<(), ClientError> {
        self.session.clear()?;
        Ok(())
    }

    pub async fn me(&mut self) -> Result<PublicUser, ClientError> {
        self.get_data("/auth/me").await
    }

    pub async fn overview(&mut self) -> Result<StakingOverview, ClientError> {
        self.get_data("/staking/overview").await
    }

    pub async fn assets(&mut self) -> Result<Vec<StakingAsset>, ClientError> {
        self.get_data("/staking/assets").await
    }

    pub async fn rewards_history(&mut self, days: u32) -> Result<Vec<RewardHistory>, ClientError> {
        self.get_data(&format!("/staking/rewards-history?days={}", days))
            .await
    }

    pub async fn performance(&mut self, days: u32) -> Result<Vec<PerformanceData>, ClientError> {
        self.get_data(&format!("/staking/performance?days={}", days))
            .await
    }

    pub async fn add_position(
        &mut self,
        position: &CreatePositionRequest,
    ) -> Result<StakingAsset, ClientError> {
        let req = self.http.post(self.url("/staking/assets")).json(position);
        self.send_protected(req).await
    }

    /// Signup and login share the response shape; store the session on success.
    /// A 401 still reports the server's message, after dropping any old session.
    async fn authenticate(&mut self, req: RequestBuilder) -> Result<String, ClientError> {
        let response = req.send().await?;
        if response.status() == StatusCode::UNAUTHORIZED && self.session.is_logged_in() {
            warn!("credentials rejected; clearing previous session");
            self.session.clear()?;
        }
        if !response.status().is_success() {
            return Err(Self::rejected(response).await);
        }
        let auth: AuthResponse = response.json().await?;
        self.session.set(SessionData {
            token: auth.token,
            username: auth.username.clone(),
        })?;
        debug!(username = %auth.username, "session stored");
        Ok(auth.username)
    }

    async fn get_data<T: DeserializeOwned>(&mut self, path: &str) -> Result<T, ClientError> {
        let req = self.http.get(self.url(path));
        self.send_protected(req).await
    }

    async fn send_protected<T: DeserializeOwned>(
        &mut self,
        req: RequestBuilder,
    ) -> Result<T, ClientError> {
        let token = self.session.token().ok_or(ClientError::LoggedOut)?;
        let response = req.bearer_auth(token).send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!("session rejected by server; clearing it");
            self.session.clear()?;
            return Err(ClientError::Unauthorized);
        }
        if !response.status().is_success() {
            return Err(Self::rejected(response).await);
        }
        let body: DataResponse<T> = response.json().await?;
        Ok(body.data)
    }

    async fn rejected(response: Response) -> ClientError {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|b| b.error)
            .unwrap_or(text);
        ClientError::Rejected { status, message }
    }
}
