use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

/// Send `tracing` output to `path`; the terminal belongs to the UI.
///
/// `RUST_LOG` overrides the default `info` filter. Without a usable path
/// logging stays off.
pub fn configure_logging(path: Option<&Path>) {
    use tracing_subscriber::prelude::*;

    let Some(path) = path else {
        return;
    };
    if let Some(dir) = path.parent() {
        let _ = fs::create_dir_all(dir);
    }
    let file = match OpenOptions::new().create(true).append(true).open(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("pacelist: cannot open log file {}: {e}", path.display());
            return;
        }
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_line_number(true)
        .with_file(true);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}
