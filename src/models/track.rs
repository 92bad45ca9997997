//! Track model

use serde::{Deserialize, Serialize};

/// Where a track in the deck came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackOrigin {
    /// Resolved through the catalog search
    Itunes,
    /// Built-in fallback deck
    Seed,
}

impl Default for TrackOrigin {
    fn default() -> Self {
        TrackOrigin::Itunes
    }
}

/// A playable song card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Provider-assigned id, unique within a deck
    pub id: String,
    /// Track title
    pub title: String,
    /// Artist name (also the exclusion key for super-dislikes)
    pub artist: String,
    /// Album artwork url
    #[serde(default)]
    pub album_art: String,
    /// 30 second preview clip
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub origin: TrackOrigin,
}

impl Track {
    /// Create a catalog track
    pub fn new(id: impl Into<String>, title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            album_art: String::new(),
            preview_url: None,
            origin: TrackOrigin::Itunes,
        }
    }

    pub fn with_preview(mut self, url: impl Into<String>) -> Self {
        self.preview_url = Some(url.into());
        self
    }

    pub fn with_album_art(mut self, url: impl Into<String>) -> Self {
        self.album_art = url.into();
        self
    }

    /// Whether the track has a preview clip and may enter a deck
    pub fn is_playable(&self) -> bool {
        self.preview_url
            .as_deref()
            .map(|u| !u.trim().is_empty())
            .unwrap_or(false)
    }

    /// `"Title" by Artist`, the form used in AI prompts
    pub fn quoted(&self) -> String {
        format!("\"{}\" by {}", self.title, self.artist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_playable() {
        let track = Track::new("1", "Song", "Artist");
        assert!(!track.is_playable());

        let track = track.with_preview("  ");
        assert!(!track.is_playable());

        let track = Track::new("1", "Song", "Artist").with_preview("https://a/p.m4a");
        assert!(track.is_playable());
    }

    #[test]
    fn test_serializes_camel_case() {
        let track = Track::new("7", "Get Lucky", "Daft Punk")
            .with_album_art("https://img/1.jpg")
            .with_preview("https://a/p.m4a");
        let value = serde_json::to_value(&track).unwrap();

        assert_eq!(value["albumArt"], "https://img/1.jpg");
        assert_eq!(value["previewUrl"], "https://a/p.m4a");
        assert_eq!(value["origin"], "itunes");
    }

    #[test]
    fn test_quoted() {
        let track = Track::new("1", "bad guy", "Billie Eilish");
        assert_eq!(track.quoted(), "\"bad guy\" by Billie Eilish");
    }
}
