//! Authorization code flow with PKCE against the music service.
//!
//! The flow is an explicit state machine instead of a page redirect:
//! `Unauthenticated -> AwaitingCallback -> Authenticated`, and any
//! authorization failure from a catalog call sends it back to the start.

mod callback;
mod flow;
mod pkce;

pub use callback::{CallbackListener, CallbackResult, callback_outcome, spawn_callback_listener};
pub use flow::*;
pub use pkce::{attempt_state, code_challenge, generate_code_verifier};
