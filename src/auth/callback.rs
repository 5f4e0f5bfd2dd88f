use std::collections::HashMap;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use tokio::sync::{Notify, oneshot};
use tracing::{debug, warn};

use super::flow::AuthError;

/// The authorization code, or why there is none.
pub type CallbackResult = Result<String, AuthError>;

const CALLBACK_PATH: &str = "/callback";
const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

const DONE_PAGE: &str = "<html><body><h1>Authorization complete</h1>\
    <p>You can close this window and return to pacelist.</p>\
    <script>window.close()</script></body></html>";

const STALE_PAGE: &str = "<html><body><h1>Sign-in link expired</h1>\
    <p>This page belongs to an earlier sign-in attempt. \
    Use the most recent browser tab instead.</p></body></html>";

/// Interpret the query of a `/callback` request for the attempt tagged
/// `expected_state`.
///
/// Returns `None` when the request belongs to another attempt, so the
/// listener keeps waiting for the right one.
pub fn callback_outcome(
    params: &HashMap<String, String>,
    expected_state: &str,
) -> Option<CallbackResult> {
    if params.get("state").map(String::as_str) != Some(expected_state) {
        return None;
    }

    if let Some(error) = params.get("error") {
        let desc = params
            .get("error_description")
            .cloned()
            .unwrap_or_else(|| error.clone());
        return Some(Err(AuthError::Denied(desc)));
    }

    Some(
        params
            .get("code")
            .filter(|c| !c.is_empty())
            .cloned()
            .ok_or_else(|| AuthError::Callback("no code in callback".to_string())),
    )
}

/// Shared between the route handler and the shutdown future.
struct Attempt {
    expected_state: String,
    tx: Mutex<Option<Sender<CallbackResult>>>,
    done: Notify,
}

impl Attempt {
    /// Send the first outcome and wake the shutdown future; later ones are dropped.
    fn deliver(&self, result: CallbackResult) {
        let sender = match self.tx.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(sender) = sender {
            let _ = sender.send(result);
            self.done.notify_one();
        }
    }
}

/// A running callback listener. Dropping it stops the server and waits for
/// the port to be released.
pub struct CallbackListener {
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl Drop for CallbackListener {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("callback listener thread panicked");
            }
        }
    }
}

/// Bind `127.0.0.1:{port}` and serve `/callback` in the background until the
/// request tagged `expected_state` arrives. The outcome is sent on `tx`.
///
/// Binding happens before this returns, so a busy port is reported directly.
pub fn spawn_callback_listener(
    port: u16,
    expected_state: String,
    tx: Sender<CallbackResult>,
) -> Result<CallbackListener, AuthError> {
    let listener = std::net::TcpListener::bind(("127.0.0.1", port))?;
    listener.set_nonblocking(true)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let attempt = Arc::new(Attempt {
        expected_state,
        tx: Mutex::new(Some(tx)),
        done: Notify::new(),
    });
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let thread = thread::spawn(move || runtime.block_on(serve(listener, attempt, shutdown_rx)));

    Ok(CallbackListener {
        shutdown: Some(shutdown_tx),
        thread: Some(thread),
    })
}

async fn serve(
    listener: std::net::TcpListener,
    attempt: Arc<Attempt>,
    cancel: oneshot::Receiver<()>,
) {
    let listener = match tokio::net::TcpListener::from_std(listener) {
        Ok(l) => l,
        Err(e) => {
            attempt.deliver(Err(AuthError::Io(e)));
            return;
        }
    };

    // Every other path gets the router's 404.
    let app = Router::new()
        .route(CALLBACK_PATH, get(handle_callback))
        .with_state(attempt.clone());

    let finished = attempt.clone();
    let stop = async move {
        tokio::select! {
            _ = finished.done.notified() => debug!("authorization callback received"),
            _ = cancel => debug!("callback listener stopped"),
            _ = tokio::time::sleep(CALLBACK_TIMEOUT) => {
                warn!("no authorization callback within {}s", CALLBACK_TIMEOUT.as_secs());
                finished.deliver(Err(AuthError::Timeout));
            }
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(stop)
        .await
    {
        attempt.deliver(Err(AuthError::Io(e)));
    }
}

async fn handle_callback(
    State(attempt): State<Arc<Attempt>>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Html<&'static str>) {
    match callback_outcome(&params, &attempt.expected_state) {
        Some(result) => {
            attempt.deliver(result);
            (StatusCode::OK, Html(DONE_PAGE))
        }
        None => {
            warn!("ignoring callback from an earlier sign-in attempt");
            (StatusCode::BAD_REQUEST, Html(STALE_PAGE))
        }
    }
}
