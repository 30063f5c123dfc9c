//! Cinedex domain core: catalog record types, the list query model, the
//! session store, import/export payload handling, and the [`CollectionApi`]
//! seam shared by the HTTP client and the sync layer.
//!
//! This crate performs no network I/O.

pub mod api;
pub mod error;
pub mod query;
pub mod record;
pub mod session;
pub mod transfer;
pub mod types;

pub use api::CollectionApi;
pub use error::ApiError;
