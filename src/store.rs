//! Persisted preferences.
//!
//! The app never reaches for ambient storage: it is handed a `KeyValueStore`
//! and reads/writes the typed values in `prefs` through it.

mod file;
mod kv;
mod memory;
mod prefs;

pub use file::JsonFileStore;
pub use kv::{KeyValueStore, StoreError};
pub use memory::MemoryStore;
pub use prefs::*;

#[cfg(test)]
mod tests;
