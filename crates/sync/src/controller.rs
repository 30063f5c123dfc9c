//! The list-state synchronization controller.
//!
//! [`ListController`] owns the filter/sort/pagination query, the derived
//! view, and the favorites mirror, and keeps them consistent with the
//! remote store. Every list request carries a monotonically increasing
//! sequence number; a result that is no longer current when it arrives is
//! discarded, so a slow earlier response can never overwrite a fresher
//! view. The internal lock is never held across a network await.

use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};

use cinedex_core::api::CollectionApi;
use cinedex_core::error::ApiError;
use cinedex_core::query::{Filter, ListQuery, FIRST_PAGE, PAGE_SIZES};
use cinedex_core::record::{Record, RecordDraft};
use cinedex_core::session::SessionStore;
use cinedex_core::transfer::{self, ImportReceipt};
use cinedex_core::types::RecordId;

use crate::favorites::{FavoritesSet, ToggleError};

/// Lifecycle states of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListState {
    /// No authenticated session, or reset after invalidation.
    Idle,
    /// A list request is outstanding.
    Loading,
    /// The view reflects the latest successful response.
    Loaded,
    /// The latest current-sequence request failed; recoverable by any
    /// query-affecting change.
    Failed,
}

/// The consistent view the rendering layer consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub records: Vec<Record>,
    pub loading: bool,
    /// Length heuristic: true iff the last successful response filled the
    /// page. The server-reported total is not trusted for paging.
    pub has_more: bool,
}

struct Inner {
    state: ListState,
    query: ListQuery,
    records: Vec<Record>,
    has_more: bool,
    last_error: Option<String>,
    /// Sequence number of the most recently issued list request.
    seq: u64,
}

impl Inner {
    /// Reset everything except the query (logout / invalidation). Bumping
    /// the sequence supersedes any in-flight response.
    fn reset(&mut self) {
        self.state = ListState::Idle;
        self.records.clear();
        self.has_more = false;
        self.last_error = None;
        self.seq += 1;
    }
}

/// Reconciles query state, session, and favorites against the remote
/// collection, exposing one consistent [`ViewState`].
pub struct ListController {
    api: Arc<dyn CollectionApi>,
    session: Arc<SessionStore>,
    favorites: FavoritesSet,
    inner: Mutex<Inner>,
}

impl ListController {
    pub fn new(api: Arc<dyn CollectionApi>, session: Arc<SessionStore>) -> Self {
        Self {
            favorites: FavoritesSet::new(Arc::clone(&api)),
            api,
            session,
            inner: Mutex::new(Inner {
                state: ListState::Idle,
                query: ListQuery::default(),
                records: Vec::new(),
                has_more: false,
                last_error: None,
                seq: 0,
            }),
        }
    }

    // -----------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------

    pub async fn view(&self) -> ViewState {
        let inner = self.inner.lock().await;
        ViewState {
            records: inner.records.clone(),
            loading: inner.state == ListState::Loading,
            has_more: inner.has_more,
        }
    }

    pub async fn state(&self) -> ListState {
        self.inner.lock().await.state
    }

    pub async fn query(&self) -> ListQuery {
        self.inner.lock().await.query.clone()
    }

    /// Display message of the last current-sequence failure, if any.
    pub async fn last_error(&self) -> Option<String> {
        self.inner.lock().await.last_error.clone()
    }

    pub fn favorites(&self) -> &FavoritesSet {
        &self.favorites
    }

    /// The session-invalidated notification for whatever hosts the view
    /// (shown login screen, etc.); the controller itself never navigates.
    pub fn subscribe_invalidations(&self) -> broadcast::Receiver<()> {
        self.session.subscribe()
    }

    // -----------------------------------------------------------------
    // Session lifecycle
    // -----------------------------------------------------------------

    /// Prime the view after authentication: favorites mirror first, then
    /// the first page of the current query.
    pub async fn initialize(&self) -> Result<(), ApiError> {
        let favorites = self.favorites.reload().await.map(|_| ());
        self.check_auth(favorites).await?;
        self.refresh().await
    }

    /// Explicit logout: quiet credential drop plus full local reset.
    pub async fn logout(&self) {
        self.session.clear_token().await;
        self.favorites.clear().await;
        self.inner.lock().await.reset();
    }

    // -----------------------------------------------------------------
    // Query-affecting operations
    // -----------------------------------------------------------------

    /// Issue a list request for the current query, tagged with a fresh
    /// sequence number. Requires an authenticated session; fails fast
    /// with `Unauthorized` (no network) otherwise.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        if !self.session.is_authenticated().await {
            return Err(ApiError::Unauthorized);
        }

        let (seq, query) = {
            let mut inner = self.inner.lock().await;
            inner.seq += 1;
            inner.state = ListState::Loading;
            (inner.seq, inner.query.clone())
        };

        let result = self.api.list(&query).await;

        if matches!(result, Err(ApiError::Unauthorized)) {
            self.handle_unauthorized().await;
            return Err(ApiError::Unauthorized);
        }

        // Snapshot before re-locking; the session can be invalidated from
        // any other in-flight handler while this request was out.
        let authenticated = self.session.is_authenticated().await;

        let mut inner = self.inner.lock().await;
        if inner.seq != seq {
            tracing::debug!(seq, latest = inner.seq, "list response superseded, discarding");
            return Ok(());
        }
        if !authenticated {
            tracing::debug!(seq, "session ended while request was in flight, discarding");
            return Ok(());
        }

        match result {
            Ok(records) => {
                inner.has_more = records.len() as u32 == query.page_size;
                inner.records = records;
                inner.state = ListState::Loaded;
                inner.last_error = None;
                tracing::debug!(
                    seq,
                    page = query.page,
                    count = inner.records.len(),
                    has_more = inner.has_more,
                    "view updated"
                );
                Ok(())
            }
            Err(err) => {
                inner.state = ListState::Failed;
                inner.records = Vec::new();
                inner.has_more = false;
                inner.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Apply a new filter/sort form; pagination restarts at page 1.
    pub async fn apply_filters(&self, filter: Filter) -> Result<(), ApiError> {
        {
            let mut inner = self.inner.lock().await;
            inner.query.filter = filter;
            inner.query.page = FIRST_PAGE;
        }
        self.refresh().await
    }

    /// Restore the default query (filters, sort, page, page size), then
    /// re-query.
    pub async fn reset_filters(&self) -> Result<(), ApiError> {
        {
            let mut inner = self.inner.lock().await;
            inner.query = ListQuery::default();
        }
        self.refresh().await
    }

    /// Move to the next page. Returns `Ok(false)` as a pure no-op when the
    /// current view says nothing further exists (`has_more == false`).
    pub async fn next_page(&self) -> Result<bool, ApiError> {
        {
            let mut inner = self.inner.lock().await;
            if !inner.has_more {
                return Ok(false);
            }
            inner.query.page += 1;
        }
        self.refresh().await?;
        Ok(true)
    }

    /// Move to the previous page. Returns `Ok(false)` as a pure no-op from
    /// page 1.
    pub async fn prev_page(&self) -> Result<bool, ApiError> {
        {
            let mut inner = self.inner.lock().await;
            if inner.query.page <= FIRST_PAGE {
                return Ok(false);
            }
            inner.query.page -= 1;
        }
        self.refresh().await?;
        Ok(true)
    }

    /// Change the page size; pagination restarts at page 1. An unlisted
    /// size is rejected client-side without a state transition.
    pub async fn set_page_size(&self, page_size: u32) -> Result<(), ApiError> {
        if !ListQuery::is_allowed_page_size(page_size) {
            return Err(ApiError::InvalidQuery(format!(
                "page size must be one of {PAGE_SIZES:?}, got {page_size}"
            )));
        }
        {
            let mut inner = self.inner.lock().await;
            inner.query.page_size = page_size;
            inner.query.page = FIRST_PAGE;
        }
        self.refresh().await
    }

    // -----------------------------------------------------------------
    // Record operations
    // -----------------------------------------------------------------

    pub async fn get(&self, id: RecordId) -> Result<Record, ApiError> {
        let result = self.api.get(id).await;
        self.check_auth(result).await
    }

    /// Create a record, then re-fetch the current page. The view is never
    /// patched in place; server-side filter/sort evaluation stays
    /// authoritative.
    pub async fn create(&self, draft: RecordDraft) -> Result<Record, ApiError> {
        let result = self.api.create(&draft).await;
        let created = self.check_auth(result).await?;
        self.refresh_after_mutation().await;
        Ok(created)
    }

    /// Replace a record, then re-fetch the current page.
    pub async fn update(&self, record: Record) -> Result<Record, ApiError> {
        let result = self.api.update(&record).await;
        let updated = self.check_auth(result).await?;
        self.refresh_after_mutation().await;
        Ok(updated)
    }

    /// Delete a record, then re-fetch the current page.
    pub async fn delete(&self, id: RecordId) -> Result<(), ApiError> {
        let result = self.api.delete(id).await;
        self.check_auth(result).await?;
        self.refresh_after_mutation().await;
        Ok(())
    }

    /// Fetch the full-collection payload for the host to save as a file.
    pub async fn export(&self) -> Result<Vec<u8>, ApiError> {
        let result = self.api.export().await;
        self.check_auth(result).await
    }

    /// Parse, validate, and submit an import payload, then re-fetch the
    /// current page. Malformed payloads are rejected before any network
    /// call.
    pub async fn import(&self, payload: &[u8]) -> Result<ImportReceipt, ApiError> {
        let drafts = transfer::parse_import(payload)?;
        let result = self.api.import(&drafts).await;
        let receipt = self.check_auth(result).await?;
        self.refresh_after_mutation().await;
        Ok(receipt)
    }

    // -----------------------------------------------------------------
    // Favorites
    // -----------------------------------------------------------------

    pub async fn is_favorite(&self, id: RecordId) -> bool {
        self.favorites.contains(id).await
    }

    /// Toggle a favorite. An unauthorized response in either phase resets
    /// the controller like any other operation.
    pub async fn toggle_favorite(&self, id: RecordId) -> Result<bool, ToggleError> {
        let result = self.favorites.toggle(id).await;
        if let Err(err) = &result {
            if matches!(err.api_error(), ApiError::Unauthorized) {
                self.handle_unauthorized().await;
            }
        }
        result
    }

    pub async fn reload_favorites(&self) -> Result<(), ApiError> {
        let result = self.favorites.reload().await.map(|_| ());
        self.check_auth(result).await
    }

    // -----------------------------------------------------------------
    // Failure funnels
    // -----------------------------------------------------------------

    /// Inspect an operation result; an `Unauthorized` failure resets the
    /// session, favorites, and view before propagating.
    async fn check_auth<T>(&self, result: Result<T, ApiError>) -> Result<T, ApiError> {
        if let Err(ApiError::Unauthorized) = &result {
            self.handle_unauthorized().await;
        }
        result
    }

    /// Global reset on an unauthorized response, safe to reach from any
    /// in-flight handler. Session invalidation is idempotent; the sequence
    /// bump supersedes every outstanding list request.
    async fn handle_unauthorized(&self) {
        self.session.invalidate().await;
        self.favorites.clear().await;
        self.inner.lock().await.reset();
    }

    /// Post-mutation reload. Its failures are already reflected in the
    /// view state (`Failed` + `last_error`), so they are only logged here;
    /// the mutation itself succeeded.
    async fn refresh_after_mutation(&self) {
        if let Err(err) = self.refresh().await {
            tracing::warn!(error = %err, "post-mutation list refresh failed");
        }
    }
}
