//! List-state synchronization: the favorites mirror and the controller
//! that keeps the rendered view consistent with the remote store under
//! asynchronous, unordered network responses.

pub mod controller;
pub mod favorites;

pub use controller::{ListController, ListState, ViewState};
pub use favorites::{FavoritesSet, ToggleError};
