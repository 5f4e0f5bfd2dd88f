use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::model::{SelectedTrack, Track};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("index {index} is out of range for a selection of {len} tracks")]
    InvalidIndex { index: usize, len: usize },
}

/// The ordered selection. Order is the export order.
///
/// Operations return a new list instead of mutating, so callers decide when
/// the result is persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct SelectionList(Vec<SelectedTrack>);

impl SelectionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SelectedTrack> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SelectedTrack> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[SelectedTrack] {
        &self.0
    }

    pub fn total_duration(&self) -> Duration {
        self.0.iter().map(|s| s.track.duration()).sum()
    }

    /// Playable URIs in export order.
    pub fn uris(&self) -> Vec<&str> {
        self.0.iter().map(|s| s.track.uri.as_str()).collect()
    }

    /// The underlying catalog tracks in export order.
    pub fn tracks(&self) -> Vec<Track> {
        self.0.iter().map(|s| s.track.clone()).collect()
    }

    fn check_index(&self, index: usize) -> Result<(), SelectionError> {
        if index < self.0.len() {
            Ok(())
        } else {
            Err(SelectionError::InvalidIndex {
                index,
                len: self.0.len(),
            })
        }
    }
}

impl From<Vec<SelectedTrack>> for SelectionList {
    fn from(items: Vec<SelectedTrack>) -> Self {
        Self(items)
    }
}

impl<'a> IntoIterator for &'a SelectionList {
    type Item = &'a SelectedTrack;
    type IntoIter = std::slice::Iter<'a, SelectedTrack>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Append `track` with a freshly generated selection id.
pub fn add_selection(list: &SelectionList, track: Track) -> SelectionList {
    let mut items = list.0.clone();
    items.push(SelectedTrack::new(track));
    SelectionList(items)
}

/// Remove the entry at `index`, keeping everything else in order.
pub fn remove_selection(list: &SelectionList, index: usize) -> Result<SelectionList, SelectionError> {
    list.check_index(index)?;
    let mut items = list.0.clone();
    items.remove(index);
    Ok(SelectionList(items))
}
