//! Bulk export/import payload handling.
//!
//! The export payload is a JSON array of records. Import accepts the same
//! shape (server-assigned fields such as `id` are ignored), so an exported
//! file can be re-imported as-is. Parsing and validation happen locally,
//! before any network call.

use serde::Deserialize;

use crate::error::ApiError;
use crate::record::RecordDraft;

/// Local parse/validation failure of an import payload.
#[derive(Debug, thiserror::Error)]
pub enum ImportFormatError {
    #[error("payload is not valid JSON: {0}")]
    Syntax(String),

    #[error("payload must be a JSON array of records")]
    NotAnArray,

    /// One entry failed to decode or validate. `index` is 1-based, matching
    /// how the error is shown to the user.
    #[error("invalid record at entry #{index}: {reason}")]
    Entry { index: usize, reason: String },
}

impl From<ImportFormatError> for ApiError {
    fn from(err: ImportFormatError) -> Self {
        ApiError::ImportFormat(err.to_string())
    }
}

/// The server's acknowledgement of an import batch.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportReceipt {
    /// Number of records the server accepted.
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub message: String,
}

/// Parse and validate an import payload into record drafts.
///
/// Every entry must carry `{title, year, director, rating}` within the
/// documented bounds; extra fields (`id`, timestamps) are dropped so that
/// a previously exported payload round-trips.
pub fn parse_import(payload: &[u8]) -> Result<Vec<RecordDraft>, ImportFormatError> {
    let value: serde_json::Value = serde_json::from_slice(payload)
        .map_err(|e| ImportFormatError::Syntax(e.to_string()))?;

    let entries = match value {
        serde_json::Value::Array(entries) => entries,
        _ => return Err(ImportFormatError::NotAnArray),
    };

    let mut drafts = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.into_iter().enumerate() {
        let draft: RecordDraft =
            serde_json::from_value(entry).map_err(|e| ImportFormatError::Entry {
                index: idx + 1,
                reason: e.to_string(),
            })?;

        draft.check().map_err(|reason| ImportFormatError::Entry {
            index: idx + 1,
            reason,
        })?;

        drafts.push(draft);
    }

    Ok(drafts)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
