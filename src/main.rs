mod app;
mod auth;
mod catalog;
mod config;
mod library;
mod pace;
mod runtime;
mod store;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
