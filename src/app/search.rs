use std::time::{Duration, Instant};

use crate::catalog::CatalogCmd;
use crate::library::Track;

/// Query text, the result list, and which request those results belong to.
///
/// Every request gets the next sequence number; only the newest request's
/// answer is accepted, so a slow early search cannot overwrite a later one.
#[derive(Debug, Default)]
pub struct SearchState {
    pub query: String,
    pub editing: bool,
    pub results: Vec<Track>,
    pub highlighted: usize,
    edited_at: Option<Instant>,
    latest_seq: u64,
    dirty: bool,
    in_flight: bool,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_char(&mut self, c: char, now: Instant) {
        self.query.push(c);
        self.touch(now);
    }

    pub fn pop_char(&mut self, now: Instant) {
        if self.query.pop().is_some() {
            self.touch(now);
        }
    }

    pub fn clear(&mut self, now: Instant) {
        if !self.query.is_empty() {
            self.query.clear();
            self.touch(now);
        }
    }

    fn touch(&mut self, now: Instant) {
        self.edited_at = Some(now);
        self.dirty = true;
    }

    /// Ask for a refresh on the next poll, without waiting for the debounce.
    pub fn invalidate(&mut self) {
        self.edited_at = None;
        self.dirty = true;
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    /// Issue the request for the current query once the quiet period is over.
    /// An empty query asks for the user's top tracks instead.
    pub fn poll(&mut self, now: Instant, debounce: Duration) -> Option<CatalogCmd> {
        if !self.dirty {
            return None;
        }
        if let Some(at) = self.edited_at {
            if now.saturating_duration_since(at) < debounce {
                return None;
            }
        }

        self.dirty = false;
        self.in_flight = true;
        self.latest_seq += 1;
        let seq = self.latest_seq;

        let query = self.query.trim();
        Some(if query.is_empty() {
            CatalogCmd::TopTracks { seq }
        } else {
            CatalogCmd::Search {
                seq,
                query: query.to_string(),
            }
        })
    }

    /// Take results if they answer the newest request. Returns whether they were kept.
    pub fn accept(&mut self, seq: u64, tracks: Vec<Track>) -> bool {
        if seq != self.latest_seq {
            return false;
        }
        self.in_flight = false;
        self.results = tracks;
        self.highlighted = 0;
        true
    }

    /// A failed request only matters if nothing newer has been issued.
    pub fn fail(&mut self, seq: u64) -> bool {
        if seq != self.latest_seq {
            return false;
        }
        self.in_flight = false;
        true
    }

    pub fn highlighted_track(&self) -> Option<&Track> {
        self.results.get(self.highlighted)
    }

    pub fn highlight_next(&mut self) {
        if !self.results.is_empty() {
            self.highlighted = (self.highlighted + 1).min(self.results.len() - 1);
        }
    }

    pub fn highlight_prev(&mut self) {
        self.highlighted = self.highlighted.saturating_sub(1);
    }
}
