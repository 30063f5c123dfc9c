//! Cinedex HTTP client: reqwest-backed access to the remote catalog,
//! favorites, and auth endpoints.
//!
//! All response-shape normalization and failure classification happens at
//! this boundary ([`response`]); callers above it only ever see domain
//! types and [`ApiError`](cinedex_core::error::ApiError).

pub mod auth;
pub mod collection;
mod response;

pub use auth::AuthClient;
pub use collection::CollectionClient;
