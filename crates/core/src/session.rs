//! Session store: the current bearer credential and its lifecycle.
//!
//! [`SessionStore`] is shared via `Arc` by every component that talks to
//! the remote service. Consumers subscribe to the invalidation broadcast
//! instead of the store knowing anything about views or navigation.

use tokio::sync::{broadcast, RwLock};

/// Buffer capacity for the invalidation broadcast channel.
const INVALIDATION_CAPACITY: usize = 16;

/// Holds the opaque bearer token for the current user session.
///
/// Lifecycle: installed on successful login or registration, removed on
/// explicit logout ([`clear_token`](Self::clear_token)) or when the remote
/// service rejects the credential ([`invalidate`](Self::invalidate)).
pub struct SessionStore {
    token: RwLock<Option<String>>,
    invalidations: broadcast::Sender<()>,
}

impl SessionStore {
    pub fn new() -> Self {
        let (invalidations, _) = broadcast::channel(INVALIDATION_CAPACITY);
        Self {
            token: RwLock::new(None),
            invalidations,
        }
    }

    /// Install the credential after a successful login or registration.
    pub async fn set_token(&self, token: impl Into<String>) {
        *self.token.write().await = Some(token.into());
    }

    /// Remove the credential without firing the invalidation broadcast.
    /// Used for explicit logout; in-flight result discard is handled by the
    /// controller's sequence discipline.
    pub async fn clear_token(&self) {
        *self.token.write().await = None;
    }

    /// Current credential, if any.
    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// Drop the credential because the remote service rejected it.
    ///
    /// Idempotent: the broadcast fires exactly once per invalidation event.
    /// Concurrent unauthorized responses race on the write lock and only
    /// the caller that actually removes the token notifies subscribers.
    pub async fn invalidate(&self) {
        let had_token = self.token.write().await.take().is_some();
        if had_token {
            tracing::warn!("session credential rejected by the remote service");
            // Ignore the SendError — it only means there are zero receivers.
            let _ = self.invalidations.send(());
        }
    }

    /// Subscribe to session-invalidation events.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.invalidations.subscribe()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
