use std::env;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::info;

use crate::app::App;
use crate::catalog::{CatalogWorker, HttpConnector};
use crate::config;

mod event_loop;
mod logging;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    if env::args().skip(1).any(|a| a == "--default-config") {
        print!("{}", config::Settings::default().to_toml()?);
        return Ok(());
    }

    let settings = settings::load_settings();
    logging::configure_logging(settings.storage.log_path().as_deref());
    info!("pacelist {} starting", env!("CARGO_PKG_VERSION"));

    let store = startup::open_store(&settings.storage);
    let mut app = App::new(settings.clone(), store);
    let worker = CatalogWorker::spawn(
        HttpConnector::new(settings.catalog.clone()),
        app.access_token().map(str::to_string),
    );

    let mut state = event_loop::EventLoopState::default();
    // Nothing works without a credential, so ask for one right away.
    if !app.is_authenticated() {
        startup::begin_auth(&mut app, &mut state);
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(&mut terminal, &mut app, &worker, &mut state);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
