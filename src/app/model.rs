//! Application model: `App` owns the goal, the selection and the search
//! state, and persists every change through the injected store.
//!
//! `App` never talks to the network itself. Methods that need the catalog or
//! the browser return an [`Action`] for the runtime to carry out, and the
//! runtime feeds the outcome back in through [`App::apply_event`].

use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::auth::{AuthError, AuthFlow, AuthState, CallbackResult};
use crate::catalog::{CatalogCmd, CatalogEvent, PlaylistRef};
use crate::config::Settings;
use crate::library::{
    Direction, SelectionError, SelectionList, Track, add_selection, move_selection,
    remove_selection,
};
use crate::pace::{
    Projection, Segment, TimelineConfig, alignment_delta, compute_segments, format_pace,
    project_selection, stack_height, total_height,
};
use crate::store::{
    KeyValueStore, StoreError, clear_access_token, clear_code_verifier, load_access_token,
    load_code_verifier, load_selection, load_timeline, save_access_token, save_code_verifier,
    save_selection, save_timeline,
};

use super::search::SearchState;

/// Which pane receives key presses.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Goal,
    Search,
    Selection,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Self::Goal => Self::Search,
            Self::Search => Self::Selection,
            Self::Selection => Self::Goal,
        }
    }
}

/// One line of feedback shown under the header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub is_error: bool,
}

/// Side effects the runtime performs on behalf of `App`.
#[derive(Debug)]
pub enum Action {
    Catalog(CatalogCmd),
    /// Open the authorize page and listen for the callback.
    BeginAuth,
    OpenUrl(String),
}

/// The main application model.
pub struct App {
    pub settings: Settings,
    pub focus: Focus,
    pub search: SearchState,
    /// Highlighted row of the selection pane.
    pub cursor: usize,

    timeline: TimelineConfig,
    selection: SelectionList,
    auth: AuthFlow,
    status: Option<Status>,
    last_playlist: Option<PlaylistRef>,
    store: Box<dyn KeyValueStore>,
}

impl App {
    /// Restore the goal, the selection and any credential from `store`.
    pub fn new(settings: Settings, store: Box<dyn KeyValueStore>) -> Self {
        let timeline = load_timeline(&*store, &settings.timeline);
        let selection = load_selection(&*store);
        let auth = AuthFlow::resume(
            load_access_token(&*store),
            load_code_verifier(&*store),
        );
        info!(
            tracks = selection.len(),
            authenticated = auth.is_authenticated(),
            "state restored"
        );

        let mut search = SearchState::new();
        search.invalidate();

        Self {
            settings,
            focus: Focus::default(),
            search,
            cursor: 0,
            timeline,
            selection,
            auth,
            status: None,
            last_playlist: None,
            store,
        }
    }

    pub fn timeline(&self) -> &TimelineConfig {
        &self.timeline
    }

    pub fn selection(&self) -> &SelectionList {
        &self.selection
    }

    pub fn auth_state(&self) -> &AuthState {
        self.auth.state()
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.auth.access_token()
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn last_playlist(&self) -> Option<&PlaylistRef> {
        self.last_playlist.as_ref()
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            is_error: false,
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            is_error: true,
        });
    }

    // Goal

    pub fn pixels_per_minute(&self) -> f64 {
        self.timeline.pixels_per_minute(&self.settings.timeline)
    }

    pub fn segments(&self) -> Vec<Segment> {
        compute_segments(&self.timeline, &self.settings.timeline)
    }

    pub fn projections(&self) -> Vec<Projection> {
        project_selection(&self.selection, self.pixels_per_minute())
    }

    /// Goal time per unit of distance, as `HH:MM:SS`.
    pub fn pace_label(&self) -> String {
        if self.timeline.validate().is_err() {
            return format_pace(f64::NAN);
        }
        format_pace(self.timeline.minutes_per_unit())
    }

    /// Selection length minus goal time, in minutes (positive when over).
    pub fn alignment_minutes(&self) -> f64 {
        let ppm = self.pixels_per_minute();
        let delta = alignment_delta(
            stack_height(&self.selection, ppm),
            total_height(&self.segments()),
        );
        delta / ppm
    }

    pub fn toggle_unit(&mut self) {
        let mut next = self.timeline;
        next.unit = next.unit.toggle();
        self.edit_goal(next);
    }

    pub fn adjust_length(&mut self, delta: f64) {
        let mut next = self.timeline;
        // keep one decimal so repeated steps do not accumulate drift
        next.goal_length = ((next.goal_length + delta) * 10.0).round() / 10.0;
        self.edit_goal(next);
    }

    pub fn adjust_goal_time(&mut self, delta_minutes: f64) {
        let mut next = self.timeline;
        next.goal_time_minutes += delta_minutes;
        self.edit_goal(next);
    }

    pub fn adjust_scale(&mut self, delta: f64) {
        let mut next = self.timeline;
        next.scale = self.settings.timeline.clamp_scale(next.scale + delta);
        self.edit_goal(next);
    }

    /// Replace the goal unless the candidate is degenerate.
    pub fn edit_goal(&mut self, candidate: TimelineConfig) {
        if let Err(e) = candidate.validate() {
            self.set_error(e.to_string());
            return;
        }
        if candidate == self.timeline {
            return;
        }
        self.timeline = candidate;
        self.status = None;
        let saved = save_timeline(&mut *self.store, &self.timeline);
        self.report_store(saved);
    }

    // Selection

    pub fn add_track(&mut self, track: Track) {
        self.selection = add_selection(&self.selection, track);
        self.cursor = self.selection.len() - 1;
        self.persist_selection();
    }

    /// Append the highlighted search result.
    pub fn add_highlighted(&mut self) {
        if let Some(track) = self.search.highlighted_track().cloned() {
            self.set_status(format!("added {}", track.name));
            self.add_track(track);
        }
    }

    pub fn remove_at_cursor(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        match remove_selection(&self.selection, self.cursor) {
            Ok(list) => {
                self.selection = list;
                self.cursor = self.cursor.min(self.selection.len().saturating_sub(1));
                self.persist_selection();
            }
            Err(e) => self.selection_bug(e),
        }
    }

    pub fn move_at_cursor(&mut self, direction: Direction) {
        if self.selection.is_empty() {
            return;
        }
        match move_selection(&self.selection, self.cursor, direction) {
            Ok(list) => {
                self.selection = list;
                self.cursor = match direction {
                    Direction::Backward => self.cursor.saturating_sub(1),
                    Direction::Forward => (self.cursor + 1).min(self.selection.len() - 1),
                };
                self.persist_selection();
            }
            Err(e) => self.selection_bug(e),
        }
    }

    pub fn cursor_next(&mut self) {
        if !self.selection.is_empty() {
            self.cursor = (self.cursor + 1).min(self.selection.len() - 1);
        }
    }

    pub fn cursor_prev(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Indices come from the cursor, so a bad one is a bug in this module.
    fn selection_bug(&mut self, e: SelectionError) {
        warn!("ignoring selection edit: {e}");
        debug_assert!(false, "selection edit with bad index: {e}");
        self.cursor = 0;
    }

    fn persist_selection(&mut self) {
        let saved = save_selection(&mut *self.store, &self.selection);
        self.report_store(saved);
    }

    fn report_store(&mut self, result: Result<(), StoreError>) {
        if let Err(e) = result {
            warn!("failed to persist state: {e}");
            self.set_error(format!("could not save: {e}"));
        }
    }

    // Search

    /// The next catalog request, once typing has paused long enough.
    pub fn poll_search(&mut self, now: Instant) -> Option<Action> {
        if !self.auth.is_authenticated() {
            return None;
        }
        let debounce = Duration::from_millis(self.settings.search.debounce_ms);
        self.search.poll(now, debounce).map(Action::Catalog)
    }

    // Playlist export

    pub fn export(&mut self) -> Option<Action> {
        if self.selection.is_empty() {
            self.set_error("add some tracks before creating a playlist");
            return None;
        }
        if !self.auth.is_authenticated() {
            self.set_error("sign in first (press a)");
            return None;
        }
        self.set_status(format!(
            "creating playlist with {} tracks...",
            self.selection.len()
        ));
        Some(Action::Catalog(CatalogCmd::Export {
            selection: self.selection.clone(),
        }))
    }

    // Authorization

    /// Start a new handshake and return the URL to open.
    ///
    /// Refused with `AlreadySignedIn` while a credential is held.
    pub fn begin_auth(&mut self) -> Result<String, AuthError> {
        let url = self.auth.begin(&self.settings.catalog)?;
        if let Some(verifier) = self.auth.pending_verifier().map(str::to_string) {
            let saved = save_code_verifier(&mut *self.store, &verifier);
            self.report_store(saved);
        }
        self.set_status("waiting for authorization in the browser...");
        Ok(url)
    }

    /// `state` tag the callback of the pending attempt must carry.
    pub fn pending_auth_state(&self) -> Option<String> {
        self.auth.pending_state()
    }

    /// Hand a callback outcome to the flow; a code becomes a token exchange.
    pub fn on_callback(&mut self, result: CallbackResult) -> Option<Action> {
        match result {
            Ok(code) => {
                let Some(verifier) = self.auth.pending_verifier().map(str::to_string) else {
                    warn!("authorization callback arrived while not awaiting one");
                    return None;
                };
                Some(Action::Catalog(CatalogCmd::ExchangeCode { code, verifier }))
            }
            Err(e) => {
                self.abandon_auth(format!("authorization failed: {e}"));
                None
            }
        }
    }

    /// Fold a finished catalog call into the model.
    pub fn apply_event(&mut self, event: CatalogEvent) -> Option<Action> {
        match event {
            CatalogEvent::Results { seq, tracks } => {
                if !self.search.accept(seq, tracks) {
                    tracing::debug!(seq, "discarding stale results");
                }
                None
            }
            CatalogEvent::SearchFailed { seq, message } => {
                if self.search.fail(seq) {
                    self.set_error(format!("search failed: {message}"));
                }
                None
            }
            CatalogEvent::PlaylistCreated(playlist) => {
                self.set_status(format!("playlist created ({})", playlist.id));
                let url = playlist.external_url.clone();
                self.last_playlist = Some(playlist);
                url.map(Action::OpenUrl)
            }
            CatalogEvent::ExportFailed(message) => {
                self.set_error(format!("could not create playlist: {message}"));
                None
            }
            CatalogEvent::Authorized { access_token } => {
                if let Err(e) = self.auth.complete(access_token.clone()) {
                    warn!("unexpected token: {e}");
                    return None;
                }
                let saved = save_access_token(&mut *self.store, &access_token)
                    .and_then(|()| clear_code_verifier(&mut *self.store));
                self.report_store(saved);
                self.set_status("signed in");
                self.search.invalidate();
                None
            }
            CatalogEvent::AuthFailed(message) => {
                self.abandon_auth(format!("sign-in failed: {message}"));
                None
            }
            CatalogEvent::StaleCredential => {
                self.auth.invalidate();
                let cleared = clear_access_token(&mut *self.store);
                self.report_store(cleared);
                self.set_status("session expired, signing in again");
                // the request that failed is repeated once signed in
                self.search.invalidate();
                Some(Action::BeginAuth)
            }
        }
    }

    fn abandon_auth(&mut self, message: String) {
        warn!("{message}");
        self.auth.invalidate();
        let cleared = clear_code_verifier(&mut *self.store);
        self.report_store(cleared);
        self.set_error(format!("{message} (press a to retry)"));
    }
}
