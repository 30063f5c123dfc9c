//! REST client for the catalog and favorites endpoints.
//!
//! [`CollectionClient`] implements [`CollectionApi`] over HTTP. It holds
//! no mutable state beyond the connection pool and the injected session
//! store whose credential it attaches to every request.

use std::sync::Arc;

use async_trait::async_trait;

use cinedex_core::api::CollectionApi;
use cinedex_core::error::ApiError;
use cinedex_core::query::ListQuery;
use cinedex_core::record::{Record, RecordDraft};
use cinedex_core::session::SessionStore;
use cinedex_core::transfer::ImportReceipt;
use cinedex_core::types::RecordId;

use crate::response::{self, ListPayload};

/// HTTP client for the remote collection service.
pub struct CollectionClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl CollectionClient {
    /// Create a client rooted at `base_url` (e.g. `http://host:8080/api`).
    pub fn new(base_url: impl Into<String>, session: Arc<SessionStore>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, session)
    }

    /// Create a client reusing an existing [`reqwest::Client`] (connection
    /// pooling with the auth client).
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

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Attach the bearer credential when one is present; unauthenticated
    /// requests go out without the header.
    async fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.session.token().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        let request = self.authorize(request).await;
        let response = request.send().await.map_err(response::transport)?;
        response::classify(response, &self.session).await
    }
}

#[async_trait]
impl CollectionApi for CollectionClient {
    async fn list(&self, query: &ListQuery) -> Result<Vec<Record>, ApiError> {
        query.validate()?;

        let request = self
            .http
            .get(self.url("/collection"))
            .query(&query.to_params());
        let response = self.send(request).await?;

        let payload: ListPayload = response.json().await.map_err(response::transport)?;
        Ok(payload.into_records())
    }

    async fn get(&self, id: RecordId) -> Result<Record, ApiError> {
        let request = self.http.get(self.url(&format!("/collection/{id}")));
        let response = self.send(request).await?;
        response.json().await.map_err(response::transport)
    }

    async fn create(&self, draft: &RecordDraft) -> Result<Record, ApiError> {
        let request = self.http.post(self.url("/collection")).json(draft);
        let response = self.send(request).await?;
        response.json().await.map_err(response::transport)
    }

    async fn update(&self, record: &Record) -> Result<Record, ApiError> {
        let request = self
            .http
            .put(self.url(&format!("/collection/{}", record.id)))
            .json(record);
        let response = self.send(request).await?;
        response.json().await.map_err(response::transport)
    }

    async fn delete(&self, id: RecordId) -> Result<(), ApiError> {
        let request = self.http.delete(self.url(&format!("/collection/{id}")));
        self.send(request).await?;
        Ok(())
    }

    async fn export(&self) -> Result<Vec<u8>, ApiError> {
        let request = self.http.get(self.url("/collection/export"));
        let response = self.send(request).await?;
        let bytes = response.bytes().await.map_err(response::transport)?;
        Ok(bytes.to_vec())
    }

    async fn import(&self, drafts: &[RecordDraft]) -> Result<ImportReceipt, ApiError> {
        let request = self.http.post(self.url("/collection/import")).json(&drafts);
        let response = self.send(request).await?;
        response.json().await.map_err(response::transport)
    }

    async fn favorites(&self) -> Result<Vec<Record>, ApiError> {
        let request = self.http.get(self.url("/favorites"));
        let response = self.send(request).await?;

        // The server sends `null` instead of `[]` for an empty list.
        let records: Option<Vec<Record>> =
            response.json().await.map_err(response::transport)?;
        Ok(records.unwrap_or_default())
    }

    async fn favorite_add(&self, id: RecordId) -> Result<(), ApiError> {
        let request = self.http.post(self.url(&format!("/favorites/{id}")));
        self.send(request).await?;
        Ok(())
    }

    async fn favorite_remove(&self, id: RecordId) -> Result<(), ApiError> {
        let request = self.http.delete(self.url(&format!("/favorites/{id}")));
        self.send(request).await?;
        Ok(())
    }
}
