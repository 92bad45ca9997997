//! Per-user swipe session
//!
//! Every method is one atomic transition; callers hold the session lock for
//! the duration of a call and never across an await.

use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

use super::deck::{Deck, DeckSnapshot};
use super::seed::seed_tracks;
use crate::errors::AppError;
use crate::models::{DeckStatus, SwipeDirection, Track, View};

/// Identifies one deck load; a newer reset supersedes older loads
pub type LoadTicket = u64;

#[derive(Debug, Default)]
pub struct SwipeSession {
    deck: Deck,
    liked: Vec<Track>,
    disliked: BTreeSet<String>,
    vibe: Option<String>,
    view: View,
    suggestions: Vec<Track>,
    playing: bool,
    /// Generation of the swipe whose advance is still pending
    pending_advance: Option<u64>,
    advance_generation: u64,
    /// Ticket of the load in flight, if any
    loading: Option<LoadTicket>,
    load_generation: LoadTicket,
    loaded_once: bool,
}

/// Result of a swipe, telling the caller which advance to commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwipeOutcome {
    pub generation: u64,
    pub liked: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub status: DeckStatus,
    #[serde(flatten)]
    pub deck: DeckSnapshot,
    pub active: Option<Track>,
    pub is_playing: bool,
    /// The active card has been swiped and is about to be retired
    pub advancing: bool,
    pub liked_count: usize,
    pub disliked_artists: Vec<String>,
    pub view: View,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikesSnapshot {
    pub liked: Vec<Track>,
    pub vibe: Option<String>,
}

impl SwipeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> DeckStatus {
        if self.loading.is_some() || !self.loaded_once {
            DeckStatus::Loading
        } else if self.deck.is_exhausted() {
            DeckStatus::Exhausted
        } else {
            DeckStatus::Ready
        }
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn liked(&self) -> &[Track] {
        &self.liked
    }

    pub fn disliked(&self) -> &BTreeSet<String> {
        &self.disliked
    }

    pub fn vibe(&self) -> Option<&str> {
        self.vibe.as_deref()
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn suggestions(&self) -> &[Track] {
        &self.suggestions
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn has_pending_advance(&self) -> bool {
        self.pending_advance.is_some()
    }

    // deck lifecycle

    /// Claim the first load. Returns a ticket only for the first caller.
    pub fn begin_initial_load(&mut self) -> Option<LoadTicket> {
        if self.loaded_once || self.loading.is_some() {
            return None;
        }
        Some(self.start_load())
    }

    /// Start over: liked list and vibe are cleared, disliked artists stay.
    pub fn begin_reset(&mut self) -> LoadTicket {
        self.flush();
        self.liked.clear();
        self.vibe = None;
        self.deck = Deck::default();
        self.playing = false;
        self.start_load()
    }

    fn start_load(&mut self) -> LoadTicket {
        self.load_generation += 1;
        self.loading = Some(self.load_generation);
        self.load_generation
    }

    /// Install a freshly loaded batch, replacing the deck.
    ///
    /// Disliked artists are removed first; if nothing survives the built-in
    /// seed deck is used, filtered the same way. Returns false when the
    /// ticket was superseded by a newer load.
    pub fn install_initial(&mut self, ticket: LoadTicket, batch: Vec<Track>) -> bool {
        if self.loading != Some(ticket) {
            return false;
        }

        let mut tracks = self.without_disliked(batch);
        if tracks.is_empty() {
            tracks = self.without_disliked(seed_tracks());
        }

        // tracks appended while the load was in flight stay on top
        let loaded: HashSet<String> = tracks.iter().map(|t| t.id.clone()).collect();
        tracks.extend(
            self.deck
                .tracks()
                .iter()
                .filter(|t| !loaded.contains(&t.id))
                .cloned(),
        );

        self.deck = Deck::new(tracks);
        self.playing = false;
        self.loading = None;
        self.loaded_once = true;
        true
    }

    /// Give up a load that will never be installed.
    ///
    /// An empty deck goes back to needing its first load, so the next
    /// snapshot starts a fresh one.
    pub fn abandon_load(&mut self, ticket: LoadTicket) -> bool {
        if self.loading != Some(ticket) {
            return false;
        }
        self.loading = None;
        if self.deck.is_empty() {
            self.loaded_once = false;
        }
        true
    }

    fn without_disliked(&self, tracks: Vec<Track>) -> Vec<Track> {
        tracks
            .into_iter()
            .filter(|t| !self.disliked.contains(&t.artist))
            .collect()
    }

    // swiping

    /// Swipe the active card. The cursor moves later, via `commit_advance`.
    pub fn swipe(&mut self, direction: SwipeDirection) -> Result<SwipeOutcome, AppError> {
        self.flush();

        let active = self.deck.active().cloned().ok_or(AppError::DeckExhausted)?;

        let liked = direction == SwipeDirection::Right;
        if liked {
            self.liked.insert(0, active);
        }

        self.playing = false;
        self.advance_generation += 1;
        self.pending_advance = Some(self.advance_generation);

        Ok(SwipeOutcome {
            generation: self.advance_generation,
            liked,
        })
    }

    /// Retire the swiped card if `generation` is still the pending one
    pub fn commit_advance(&mut self, generation: u64) -> bool {
        if self.pending_advance != Some(generation) {
            return false;
        }
        self.pending_advance = None;
        self.deck.retire_active();
        self.playing = false;
        true
    }

    /// Apply a pending advance right away
    pub fn flush(&mut self) {
        if let Some(generation) = self.pending_advance {
            self.commit_advance(generation);
        }
    }

    /// Ban the active card's artist and drop all of their tracks
    pub fn super_dislike(&mut self) -> Result<String, AppError> {
        self.flush();

        let artist = self
            .deck
            .active()
            .map(|t| t.artist.clone())
            .ok_or(AppError::DeckExhausted)?;

        self.disliked.insert(artist.clone());
        self.playing = false;
        self.deck.exclude_artists(&self.disliked);

        Ok(artist)
    }

    /// Append tracks to the end of the deck, making the last one active.
    ///
    /// Disliked artists are always dropped. With `dedupe`, ids already in
    /// the deck or repeated within the batch are dropped too. Returns the
    /// number of tracks added.
    pub fn append_batch(&mut self, batch: Vec<Track>, dedupe: bool) -> usize {
        self.flush();

        let mut tracks = self.without_disliked(batch);
        if dedupe {
            let mut seen: HashSet<String> =
                self.deck.tracks().iter().map(|t| t.id.clone()).collect();
            tracks.retain(|t| seen.insert(t.id.clone()));
        }

        let added = tracks.len();
        if added > 0 {
            self.deck.append(tracks);
            self.playing = false;
            // an appended deck counts as loaded unless a load is running
            if self.loading.is_none() {
                self.loaded_once = true;
            }
        }
        added
    }

    /// Play or pause the active card
    pub fn toggle_play(&mut self) -> Result<bool, AppError> {
        self.flush();

        if self.deck.active().is_none() {
            return Err(AppError::DeckExhausted);
        }
        self.playing = !self.playing;
        Ok(self.playing)
    }

    // liked list

    pub fn delete_liked(&mut self, id: &str) -> Result<(), AppError> {
        let before = self.liked.len();
        self.liked.retain(|t| t.id != id);
        if self.liked.len() == before {
            return Err(AppError::NotFound(format!("Liked song {} not found", id)));
        }
        Ok(())
    }

    pub fn set_vibe(&mut self, vibe: String) {
        self.vibe = Some(vibe);
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
    }

    // friend suggestions

    /// Stage a track, newest first. Returns false if it was already staged.
    pub fn add_suggestion(&mut self, track: Track) -> Result<bool, AppError> {
        if !track.is_playable() {
            return Err(AppError::validation("Only songs with a preview can be suggested"));
        }
        if self.suggestions.iter().any(|t| t.id == track.id) {
            return Ok(false);
        }
        self.suggestions.insert(0, track);
        Ok(true)
    }

    pub fn remove_suggestion(&mut self, id: &str) -> Result<(), AppError> {
        let before = self.suggestions.len();
        self.suggestions.retain(|t| t.id != id);
        if self.suggestions.len() == before {
            return Err(AppError::NotFound(format!("Suggestion {} not found", id)));
        }
        Ok(())
    }

    pub fn is_suggested(&self, id: &str) -> bool {
        self.suggestions.iter().any(|t| t.id == id)
    }

    /// Move staged suggestions into the deck and go back to swiping
    pub fn finish_suggestions(&mut self) -> usize {
        let staged = std::mem::take(&mut self.suggestions);
        let added = self.append_batch(staged, true);
        self.view = View::Swipe;
        added
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status(),
            deck: self.deck.snapshot(),
            active: self.deck.active().cloned(),
            is_playing: self.playing,
            advancing: self.pending_advance.is_some(),
            liked_count: self.liked.len(),
            disliked_artists: self.disliked.iter().cloned().collect(),
            view: self.view,
        }
    }

    pub fn likes_snapshot(&self) -> LikesSnapshot {
        LikesSnapshot {
            liked: self.liked.clone(),
            vibe: self.vibe.clone(),
        }
    }
}
