//! Authentication client for the `/auth` endpoints.
//!
//! Password hashing and token issuance are owned by the remote service;
//! this client only exchanges credentials for an opaque bearer token and
//! installs it into the shared [`SessionStore`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use cinedex_core::error::ApiError;
use cinedex_core::session::SessionStore;

use crate::response;

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

/// Client for registration and login.
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl AuthClient {
    pub fn new(base_url: impl Into<String>, session: Arc<SessionStore>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, session)
    }

    /// Reuse an existing [`reqwest::Client`] (connection pooling with the
    /// collection client).
    pub fn with_client(
        http: reqwest::Client,
        base_url: impl Into<String>,
        session: Arc<SessionStore>,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    /// `POST /auth/login` — exchange credentials for a token and start the
    /// session. A 401 here means bad credentials, not an expired session,
    /// so it surfaces as `RequestFailed` with the server's message.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        self.authenticate("/auth/login", username, password).await
    }

    /// `POST /auth/register` — create the account and sign in immediately
    /// with the returned token.
    pub async fn register(&self, username: &str, password: &str) -> Result<(), ApiError> {
        self.authenticate("/auth/register", username, password).await
    }

    async fn authenticate(
        &self,
        path: &str,
        username: &str,
        password: &str,
    ) -> Result<(), ApiError> {
        let request = self
            .http
            .post(format!("{}{path}", self.base_url))
            .json(&Credentials { username, password });

        let response = request.send().await.map_err(response::transport)?;
        let response = response::classify_unauthenticated(response).await?;

        let body: TokenResponse = response.json().await.map_err(response::transport)?;
        self.session.set_token(body.token).await;

        tracing::info!(username, "session established");
        Ok(())
    }
}
