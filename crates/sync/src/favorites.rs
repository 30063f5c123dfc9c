//! Local mirror of the per-user favorites membership set.
//!
//! The remote service owns the set; this mirror is only ever populated by
//! its own `/favorites` fetch (never inferred from list responses) and is
//! cleared on logout or session invalidation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::Mutex;

use cinedex_core::api::CollectionApi;
use cinedex_core::error::ApiError;
use cinedex_core::types::RecordId;

/// Failure of a [`FavoritesSet::toggle`], split by phase so callers can
/// tell whether the mutation itself failed (mirror untouched) or only the
/// confirming reload did (mirror left at its last known-good contents).
#[derive(Debug, thiserror::Error)]
pub enum ToggleError {
    /// The add/remove request failed; the mirror was not touched.
    #[error("favorite update failed: {0}")]
    Mutate(#[source] ApiError),

    /// The add/remove succeeded but the confirming reload failed; the
    /// mirror still holds its previous contents.
    #[error("favorite updated but refresh failed: {0}")]
    Reload(#[source] ApiError),
}

impl ToggleError {
    /// The underlying classified failure, whichever phase it came from.
    pub fn api_error(&self) -> &ApiError {
        match self {
            Self::Mutate(err) | Self::Reload(err) => err,
        }
    }
}

/// The authoritative local mirror of favorited record ids.
pub struct FavoritesSet {
    api: Arc<dyn CollectionApi>,
    ids: Mutex<HashSet<RecordId>>,
    /// Per-id toggle locks: toggles on the same id serialize, toggles on
    /// different ids proceed independently.
    toggle_locks: Mutex<HashMap<RecordId, Arc<Mutex<()>>>>,
}

impl FavoritesSet {
    pub fn new(api: Arc<dyn CollectionApi>) -> Self {
        Self {
            api,
            ids: Mutex::new(HashSet::new()),
            toggle_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the mirror with the server's current view and return it.
    ///
    /// Always a full replace; the set is small and remote, so incremental
    /// patching is not worth the drift risk.
    pub async fn reload(&self) -> Result<HashSet<RecordId>, ApiError> {
        let records = self.api.favorites().await?;
        let fresh: HashSet<RecordId> = records.into_iter().map(|r| r.id).collect();
        *self.ids.lock().await = fresh.clone();
        Ok(fresh)
    }

    pub async fn contains(&self, id: RecordId) -> bool {
        self.ids.lock().await.contains(&id)
    }

    /// Snapshot of the current membership.
    pub async fn ids(&self) -> HashSet<RecordId> {
        self.ids.lock().await.clone()
    }

    /// Drop all local membership state (logout / session invalidation).
    pub async fn clear(&self) {
        self.ids.lock().await.clear();
        self.toggle_locks.lock().await.clear();
    }

    /// Toggle membership of `id` and return the resulting membership.
    ///
    /// Not optimistic: the mutation is decided from membership observed at
    /// call entry, awaited against the server, and only the trailing full
    /// [`reload`](Self::reload) updates the mirror. Same-id calls are
    /// serialized on a per-id lock; since the remote add/remove are
    /// idempotent, a duplicate concurrent toggle repeats the same mutation
    /// and the net effect equals a single toggle.
    pub async fn toggle(&self, id: RecordId) -> Result<bool, ToggleError> {
        let was_member = self.contains(id).await;

        let lock = self.toggle_lock(id).await;
        let _serialized = lock.lock().await;

        if was_member {
            self.api
                .favorite_remove(id)
                .await
                .map_err(ToggleError::Mutate)?;
        } else {
            self.api
                .favorite_add(id)
                .await
                .map_err(ToggleError::Mutate)?;
        }

        let fresh = self.reload().await.map_err(ToggleError::Reload)?;
        Ok(fresh.contains(&id))
    }

    async fn toggle_lock(&self, id: RecordId) -> Arc<Mutex<()>> {
        self.toggle_locks
            .lock()
            .await
            .entry(id)
            .or_default()
            .clone()
    }
}
