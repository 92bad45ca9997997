//! Data models for Swipeify
//!
//! This module contains the core data structures shared by the session, the
//! adapters and the API.

mod enums;
mod spotify;
mod track;
mod user;

pub use enums::{DeckStatus, SwipeDirection, View};
pub use spotify::{
    ConnectionStatus, RawPage, RawProfile, RawTopArtist, RawTopTrack,
    SpotifyArtist, SpotifyOverview, SpotifyProfile, SpotifyTrack, TokenGrant, TokenRecord,
};
pub use track::{Track, TrackOrigin};
pub use user::User;

/// A title/artist pair suggested by the language model
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SongIdea {
    pub title: String,
    pub artist: String,
}

impl SongIdea {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
        }
    }
}
