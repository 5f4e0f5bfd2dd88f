use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::{Action, App, Focus};
use crate::auth::{CallbackListener, CallbackResult};
use crate::catalog::{CatalogCmd, CatalogWorker};
use crate::library::Direction;
use crate::ui;

use super::startup::begin_auth;

/// State tracked by the runtime event loop across iterations.
#[derive(Default)]
pub struct EventLoopState {
    /// Callback listener of the current sign-in attempt.
    pub listener: Option<CallbackListener>,
    /// Outcome channel of `listener`.
    pub callback_rx: Option<Receiver<CallbackResult>>,
}

impl EventLoopState {
    /// Shut down the callback listener, releasing its port.
    pub fn stop_listener(&mut self) {
        self.callback_rx = None;
        self.listener = None;
    }
}

/// Main terminal event loop: handles input, UI drawing and the results of
/// background work. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
    worker: &CatalogWorker,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        if let Some(result) = poll_callback(state) {
            let action = app.on_callback(result);
            perform(action, app, worker, state);
        }

        while let Some(ev) = worker.try_recv() {
            let action = app.apply_event(ev);
            perform(action, app, worker, state);
        }

        let action = app.poll_search(Instant::now());
        perform(action, app, worker, state);

        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, app, worker, state) {
                    break;
                }
            }
        }
    }

    info!("shutting down");
    state.stop_listener();
    worker.shutdown();
    Ok(())
}

/// Take the listener's outcome if it has one; the listener is done after
/// its first outcome.
fn poll_callback(state: &mut EventLoopState) -> Option<CallbackResult> {
    let rx = state.callback_rx.as_ref()?;
    match rx.try_recv() {
        Ok(result) => {
            state.stop_listener();
            Some(result)
        }
        Err(TryRecvError::Empty) => None,
        Err(TryRecvError::Disconnected) => {
            state.stop_listener();
            None
        }
    }
}

/// Carry out what `App` asked for.
fn perform(
    action: Option<Action>,
    app: &mut App,
    worker: &CatalogWorker,
    state: &mut EventLoopState,
) {
    match action {
        None => {}
        Some(Action::Catalog(cmd)) => {
            if worker.send(cmd).is_err() {
                warn!("catalog worker is gone");
                app.set_error("catalog worker stopped, restart pacelist");
            }
        }
        Some(Action::BeginAuth) => {
            let _ = worker.send(CatalogCmd::SetToken(None));
            begin_auth(app, state);
        }
        Some(Action::OpenUrl(url)) => {
            if let Err(e) = open::that(&url) {
                warn!("failed to open {url}: {e}");
                app.set_status(format!("playlist ready: {url}"));
            }
        }
    }
}

/// Handle a single key press. Returns `true` when the app should quit.
fn handle_key_event(
    key: KeyEvent,
    app: &mut App,
    worker: &CatalogWorker,
    state: &mut EventLoopState,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    if app.search.editing {
        let now = Instant::now();
        match key.code {
            KeyCode::Enter | KeyCode::Esc => app.search.editing = false,
            KeyCode::Backspace => app.search.pop_char(now),
            KeyCode::Char(c) => app.search.push_char(c, now),
            _ => {}
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Tab => app.focus = app.focus.next(),
        KeyCode::BackTab => app.focus = app.focus.next().next(),
        KeyCode::Char('a') => begin_auth(app, state),
        code => match app.focus {
            Focus::Goal => handle_goal_key(code, app),
            Focus::Search => handle_search_key(code, app),
            Focus::Selection => {
                let action = handle_selection_key(code, app);
                perform(action, app, worker, state);
            }
        },
    }

    false
}

fn handle_goal_key(code: KeyCode, app: &mut App) {
    let step = app.settings.timeline.clone();
    match code {
        KeyCode::Char('u') => app.toggle_unit(),
        KeyCode::Char('+') | KeyCode::Char('=') => app.adjust_length(step.length_step),
        KeyCode::Char('-') => app.adjust_length(-step.length_step),
        KeyCode::Char(']') => app.adjust_goal_time(step.time_step_minutes),
        KeyCode::Char('[') => app.adjust_goal_time(-step.time_step_minutes),
        KeyCode::Char('>') | KeyCode::Char('.') => app.adjust_scale(step.scale_step),
        KeyCode::Char('<') | KeyCode::Char(',') => app.adjust_scale(-step.scale_step),
        _ => {}
    }
}

fn handle_search_key(code: KeyCode, app: &mut App) {
    match code {
        KeyCode::Char('/') => app.search.editing = true,
        KeyCode::Esc => app.search.clear(Instant::now()),
        KeyCode::Enter => app.add_highlighted(),
        KeyCode::Down | KeyCode::Char('j') => app.search.highlight_next(),
        KeyCode::Up | KeyCode::Char('k') => app.search.highlight_prev(),
        _ => {}
    }
}

fn handle_selection_key(code: KeyCode, app: &mut App) -> Option<Action> {
    match code {
        KeyCode::Down | KeyCode::Char('j') => app.cursor_next(),
        KeyCode::Up | KeyCode::Char('k') => app.cursor_prev(),
        KeyCode::Char('K') => app.move_at_cursor(Direction::Backward),
        KeyCode::Char('J') => app.move_at_cursor(Direction::Forward),
        KeyCode::Char('d') | KeyCode::Delete => app.remove_at_cursor(),
        KeyCode::Char('c') => return app.export(),
        _ => {}
    }
    None
}
