//! Catalog record types and field validation.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::RecordId;

/// Earliest accepted release year (the year of the first film).
pub const MIN_YEAR: i32 = 1888;

/// Lowest accepted rating.
pub const MIN_RATING: f64 = 0.0;

/// Highest accepted rating.
pub const MAX_RATING: f64 = 10.0;

/// A catalog record as returned by the remote service.
///
/// The remote store owns these rows; the client only ever holds
/// read-through copies. Fields the server may add (timestamps etc.) are
/// ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub title: String,
    pub year: i32,
    pub director: String,
    pub rating: f64,
}

/// A record without a server-assigned id, used for create and import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RecordDraft {
    #[validate(length(min = 2, message = "title must be at least 2 characters"))]
    pub title: String,

    #[validate(range(min = 1888, message = "year must be 1888 or later"))]
    pub year: i32,

    #[validate(length(min = 2, message = "director must be at least 2 characters"))]
    pub director: String,

    #[validate(range(min = 0.0, max = 10.0, message = "rating must be between 0 and 10"))]
    pub rating: f64,
}

impl RecordDraft {
    /// Validate all field bounds, including the dynamic upper bound on
    /// `year`: records cannot be dated past the current UTC year.
    pub fn check(&self) -> Result<(), String> {
        self.validate().map_err(|errors| describe_errors(&errors))?;

        let current_year = chrono::Utc::now().year();
        if self.year > current_year {
            return Err(format!("year must not exceed {current_year}"));
        }
        Ok(())
    }
}

impl From<Record> for RecordDraft {
    fn from(record: Record) -> Self {
        Self {
            title: record.title,
            year: record.year,
            director: record.director,
            rating: record.rating,
        }
    }
}

/// Flatten [`validator::ValidationErrors`] into a single readable message.
fn describe_errors(errors: &validator::ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => msg.to_string(),
                None => format!("{field} is invalid"),
            })
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
