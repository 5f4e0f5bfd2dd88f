//! Client for the external music catalog: search, top tracks and playlist
//! export, plus the background worker that runs those calls off the UI thread.

mod client;
mod wire;
mod worker;

pub use client::*;
pub use worker::{CatalogCmd, CatalogEvent, CatalogWorker, Connector, HttpConnector};

#[cfg(test)]
mod tests;
