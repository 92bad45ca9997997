//! Spotify account models
//!
//! Raw provider payloads are deserialized into the `Raw*` types and mapped
//! into the trimmed shapes the panels render.

use serde::{Deserialize, Serialize};

/// Whether the signed-in user has a stored Spotify token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Connected,
    NotConnected,
}

/// Stored access/refresh token pair, at most one per user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    pub user_id: i64,
    pub access_token: String,
    pub refresh_token: String,
    /// Unix seconds
    pub expires_at: i64,
    pub scope: Option<String>,
}

impl TokenRecord {
    /// Seconds of validity left at `now`
    pub fn remaining(&self, now: i64) -> i64 {
        self.expires_at - now
    }
}

/// Token endpoint response for both grants
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
    #[serde(default)]
    pub scope: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawImage {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct RawProfile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub images: Vec<RawImage>,
}

#[derive(Debug, Deserialize)]
pub struct RawArtistRef {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawAlbum {
    #[serde(default)]
    pub images: Vec<RawImage>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawExternalUrls {
    #[serde(default)]
    pub spotify: String,
}

#[derive(Debug, Deserialize)]
pub struct RawTopTrack {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<RawArtistRef>,
    #[serde(default)]
    pub album: RawAlbum,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub external_urls: RawExternalUrls,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawFollowers {
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Deserialize)]
pub struct RawTopArtist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub images: Vec<RawImage>,
    #[serde(default)]
    pub followers: RawFollowers,
    #[serde(default)]
    pub external_urls: RawExternalUrls,
}

/// Paging wrapper used by the top items endpoints
#[derive(Debug, Deserialize)]
pub struct RawPage<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotifyProfile {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotifyTrack {
    pub id: String,
    pub name: String,
    pub artist_names: Vec<String>,
    pub album_art_url: Option<String>,
    pub preview_url: Option<String>,
    pub external_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotifyArtist {
    pub id: String,
    pub name: String,
    pub genres: Vec<String>,
    pub image_url: Option<String>,
    pub external_url: String,
    pub follower_count: u64,
}

/// Pick the widest image; images without a width count as zero
pub fn select_largest_image(images: &[RawImage]) -> Option<String> {
    let mut best = images.first()?;
    for candidate in &images[1..] {
        if candidate.width.unwrap_or(0) > best.width.unwrap_or(0) {
            best = candidate;
        }
    }
    Some(best.url.clone())
}

impl From<RawProfile> for SpotifyProfile {
    fn from(raw: RawProfile) -> Self {
        Self {
            image_url: select_largest_image(&raw.images),
            id: raw.id,
            display_name: raw.display_name,
            email: raw.email,
        }
    }
}

impl From<RawTopTrack> for SpotifyTrack {
    fn from(raw: RawTopTrack) -> Self {
        Self {
            album_art_url: select_largest_image(&raw.album.images),
            artist_names: raw.artists.into_iter().map(|a| a.name).collect(),
            id: raw.id,
            name: raw.name,
            preview_url: raw.preview_url,
            external_url: raw.external_urls.spotify,
        }
    }
}

impl From<RawTopArtist> for SpotifyArtist {
    fn from(raw: RawTopArtist) -> Self {
        Self {
            image_url: select_largest_image(&raw.images),
            id: raw.id,
            name: raw.name,
            genres: raw.genres,
            external_url: raw.external_urls.spotify,
            follower_count: raw.followers.total,
        }
    }
}

/// The three panels fetched together
#[derive(Debug, Clone, Serialize)]
pub struct SpotifyOverview {
    pub profile: SpotifyProfile,
    pub tracks: Vec<SpotifyTrack>,
    pub artists: Vec<SpotifyArtist>,
}
