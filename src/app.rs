//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the goal, the selection
//! and the auth state; `app::search` holds the debounced, sequenced search.

mod model;
mod search;

pub use model::*;
pub use search::SearchState;
