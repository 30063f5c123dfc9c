//! Error taxonomy shared across the workspace.
//!
//! Every remote operation resolves to either a success payload or one of
//! these classified failures; nothing panics across a component boundary.

/// Classified failure of a client-facing operation.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The session credential was rejected by the remote service.
    /// Fatal to the session; never retried automatically.
    #[error("unauthorized: session is no longer valid")]
    Unauthorized,

    /// A client-side query guard failed; nothing was sent to the network.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The request reached the network and failed. `status` carries the
    /// HTTP status for server-side failures and is `None` for transport
    /// failures (connect, DNS, TLS, decode).
    #[error("request failed: {message}")]
    RequestFailed {
        status: Option<u16>,
        message: String,
    },

    /// A local import payload could not be parsed or validated; reported
    /// before any network call is made.
    #[error("import format error: {0}")]
    ImportFormat(String),
}

impl ApiError {
    /// Build a [`RequestFailed`](Self::RequestFailed) for a non-2xx response.
    pub fn request_failed(status: u16, message: impl Into<String>) -> Self {
        Self::RequestFailed {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Build a [`RequestFailed`](Self::RequestFailed) for a transport-level
    /// failure that never produced an HTTP status.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::RequestFailed {
            status: None,
            message: message.into(),
        }
    }
}
