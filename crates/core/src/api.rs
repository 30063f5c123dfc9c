//! The remote collection seam.
//!
//! [`CollectionApi`] is the contract between the synchronization layer and
//! whatever talks to the remote store — the reqwest-backed client in
//! production, scripted fakes in tests. Implementations are stateless
//! beyond the credential they read and classify every failure into
//! [`ApiError`](crate::error::ApiError).

use async_trait::async_trait;

use crate::error::ApiError;
use crate::query::ListQuery;
use crate::record::{Record, RecordDraft};
use crate::transfer::ImportReceipt;
use crate::types::RecordId;

/// Request operations against the remote catalog and favorites endpoints.
#[async_trait]
pub trait CollectionApi: Send + Sync {
    /// Fetch one page of records for `query`.
    ///
    /// Fails with `InvalidQuery` before any network call if the query's
    /// pagination parameters are out of range.
    async fn list(&self, query: &ListQuery) -> Result<Vec<Record>, ApiError>;

    async fn get(&self, id: RecordId) -> Result<Record, ApiError>;

    async fn create(&self, draft: &RecordDraft) -> Result<Record, ApiError>;

    /// Replace the full record identified by `record.id`.
    async fn update(&self, record: &Record) -> Result<Record, ApiError>;

    async fn delete(&self, id: RecordId) -> Result<(), ApiError>;

    /// Fetch the whole collection as a downloadable payload.
    async fn export(&self) -> Result<Vec<u8>, ApiError>;

    /// Submit a batch of records; the server may accept the batch partially.
    async fn import(&self, drafts: &[RecordDraft]) -> Result<ImportReceipt, ApiError>;

    /// The current user's favorited records.
    async fn favorites(&self) -> Result<Vec<Record>, ApiError>;

    /// Idempotent on the server: adding an existing favorite succeeds.
    async fn favorite_add(&self, id: RecordId) -> Result<(), ApiError>;

    /// Idempotent on the server: removing an absent favorite succeeds.
    async fn favorite_remove(&self, id: RecordId) -> Result<(), ApiError>;
}
