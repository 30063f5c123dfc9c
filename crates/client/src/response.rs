//! Response classification and payload normalization at the client boundary.
//!
//! Every reply from the remote service passes through here exactly once:
//! unauthorized responses invalidate the shared session store, other
//! failures are mapped to [`ApiError::RequestFailed`] with the server's
//! message when one is present, and the list endpoint's two wire shapes
//! are normalized to a plain record sequence.

use serde::Deserialize;

use cinedex_core::error::ApiError;
use cinedex_core::record::Record;
use cinedex_core::session::SessionStore;

/// Wire shape of the list endpoint: either a bare array of records or a
/// paging envelope. The envelope names its record field `records`, with
/// `data` accepted as a legacy spelling.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListPayload {
    Bare(Vec<Record>),
    Enveloped {
        #[serde(alias = "data")]
        records: Vec<Record>,
    },
}

impl ListPayload {
    /// Normalize to the record sequence. The envelope's `page`/`limit`/
    /// `total` fields are not trusted for paging decisions and are dropped
    /// here.
    pub(crate) fn into_records(self) -> Vec<Record> {
        match self {
            Self::Bare(records) | Self::Enveloped { records } => records,
        }
    }
}

/// Error body the server sends with non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
}

/// Classify a response from an authenticated endpoint.
///
/// A 401 invalidates the session store (idempotently) and fails with
/// [`ApiError::Unauthorized`], regardless of the operation's own
/// semantics. Any other non-2xx status fails with `RequestFailed`.
pub(crate) async fn classify(
    response: reqwest::Response,
    session: &SessionStore,
) -> Result<reqwest::Response, ApiError> {
    let status = response.status();

    if status == reqwest::StatusCode::UNAUTHORIZED {
        session.invalidate().await;
        return Err(ApiError::Unauthorized);
    }

    if !status.is_success() {
        let message = error_message(response).await;
        return Err(ApiError::request_failed(status.as_u16(), message));
    }

    Ok(response)
}

/// Classify a response from the unauthenticated `/auth` endpoints.
///
/// These requests carry no session credential, so a 401 here means bad
/// credentials and maps to `RequestFailed` without touching the session.
pub(crate) async fn classify_unauthenticated(
    response: reqwest::Response,
) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let message = error_message(response).await;
        return Err(ApiError::request_failed(status.as_u16(), message));
    }
    Ok(response)
}

/// Extract the server-supplied error message, else a generic one.
async fn error_message(response: reqwest::Response) -> String {
    match response.json::<ErrorBody>().await {
        Ok(body) if !body.error.is_empty() => body.error,
        _ => "the server reported an error".to_string(),
    }
}

/// Map a transport-level failure (connect, DNS, TLS, body decode) that
/// never produced a usable HTTP response.
pub(crate) fn transport(err: reqwest::Error) -> ApiError {
    ApiError::transport(err.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
