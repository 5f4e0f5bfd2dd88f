use std::sync::mpsc;

use tracing::{info, warn};

use crate::app::App;
use crate::auth::{AuthError, CallbackResult, spawn_callback_listener};
use crate::config::StorageSettings;
use crate::store::{JsonFileStore, KeyValueStore, MemoryStore};

use super::event_loop::EventLoopState;

/// The JSON state file, or a memory-only store when no path can be resolved.
pub fn open_store(storage: &StorageSettings) -> Box<dyn KeyValueStore> {
    match storage.state_path() {
        Some(path) => {
            let store = JsonFileStore::open(path);
            info!("state file: {}", store.path().display());
            Box::new(store)
        }
        None => {
            warn!("no state path (HOME unset?), changes will not be saved");
            Box::new(MemoryStore::new())
        }
    }
}

/// Start the browser handshake: new verifier, callback listener, authorize page.
///
/// A listener left over from an earlier attempt is stopped first. Its tab
/// would carry a code that the new verifier cannot redeem.
pub fn begin_auth(app: &mut App, state: &mut EventLoopState) {
    let url = match app.begin_auth() {
        Ok(url) => url,
        Err(AuthError::AlreadySignedIn) => {
            app.set_status("already signed in");
            return;
        }
        Err(e) => {
            app.set_error(format!("could not start sign-in: {e}"));
            return;
        }
    };
    let Some(expected_state) = app.pending_auth_state() else {
        return;
    };

    state.stop_listener();
    let port = app.settings.catalog.redirect_port;
    let (tx, rx) = mpsc::channel::<CallbackResult>();
    match spawn_callback_listener(port, expected_state, tx) {
        Ok(listener) => {
            state.listener = Some(listener);
            state.callback_rx = Some(rx);
        }
        Err(e) => {
            app.set_error(format!("cannot listen on port {port}: {e}"));
            return;
        }
    }

    if let Err(e) = open::that(&url) {
        warn!("failed to open browser: {e}");
        app.set_status(format!("open this URL to sign in: {url}"));
    }
}
