//! The swipe deck: an ordered list of tracks plus a cursor
//!
//! Cards are consumed from the end. The active card sits at the cursor and a
//! swipe retires it by moving the cursor one step towards the front, so the
//! list itself only shrinks when an artist is excluded.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::models::Track;

#[derive(Debug, Clone, Default)]
pub struct Deck {
    tracks: Vec<Track>,
    cursor: Option<usize>,
}

impl Deck {
    /// A deck whose last track is active
    pub fn new(tracks: Vec<Track>) -> Self {
        let cursor = tracks.len().checked_sub(1);
        Self { tracks, cursor }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Cursor as reported to clients, `-1` when nothing is active
    pub fn current_index(&self) -> i64 {
        self.cursor.map(|c| c as i64).unwrap_or(-1)
    }

    pub fn active(&self) -> Option<&Track> {
        self.cursor.and_then(|c| self.tracks.get(c))
    }

    pub fn is_exhausted(&self) -> bool {
        self.active().is_none()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.tracks.iter().any(|t| t.id == id)
    }

    /// Move past the active card. Returns false when nothing was active.
    pub fn retire_active(&mut self) -> bool {
        match self.cursor {
            Some(c) => {
                self.cursor = c.checked_sub(1);
                true
            }
            None => false,
        }
    }

    /// Drop every track by an excluded artist, keeping the cursor on the
    /// card plain swipes would have reached.
    pub fn exclude_artists(&mut self, excluded: &BTreeSet<String>) {
        let cursor = cursor_after_exclusion(&self.tracks, self.cursor, excluded);
        self.tracks.retain(|t| !excluded.contains(&t.artist));
        self.cursor = cursor;
    }

    /// Concatenate a batch and make its last track active.
    /// An empty batch leaves the deck untouched.
    pub fn append(&mut self, batch: Vec<Track>) {
        if batch.is_empty() {
            return;
        }
        self.tracks.extend(batch);
        self.cursor = self.tracks.len().checked_sub(1);
    }

    pub fn snapshot(&self) -> DeckSnapshot {
        DeckSnapshot {
            tracks: self.tracks.clone(),
            current_index: self.current_index(),
        }
    }
}

/// New cursor after removing the excluded artists from `tracks`.
///
/// Counts the surviving tracks strictly below the old cursor; the last of
/// them becomes active. `None` when no such track exists.
pub fn cursor_after_exclusion(
    tracks: &[Track],
    cursor: Option<usize>,
    excluded: &BTreeSet<String>,
) -> Option<usize> {
    let cursor = cursor?;
    let end = cursor.min(tracks.len());
    let remaining = tracks[..end]
        .iter()
        .filter(|t| !excluded.contains(&t.artist))
        .count();

    remaining.checked_sub(1)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckSnapshot {
    pub tracks: Vec<Track>,
    pub current_index: i64,
}
