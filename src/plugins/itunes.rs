//! iTunes Search catalog adapter
//!
//! Failures never reach the caller: they are logged and collapse into an
//! empty result, the way a quiet catalog would look.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error};

use crate::models::Track;

/// Artwork size used for deck batches
const BATCH_ARTWORK: &str = "600x600bb";
/// Artwork size used for single recommendation lookups
const SINGLE_ARTWORK: &str = "800x800bb";
const SOURCE_ARTWORK: &str = "100x100bb";

/// Read-only song catalog
#[async_trait]
pub trait CatalogSearch: Send + Sync {
    /// Free-text search, playable results only
    async fn search_by_query(&self, term: &str) -> Vec<Track>;

    /// Best single match for a title/artist pair, if it is playable
    async fn search_by_title_artist(&self, title: &str, artist: &str) -> Option<Track>;
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResult {
    #[serde(default)]
    track_id: Option<i64>,
    #[serde(default)]
    track_name: Option<String>,
    #[serde(default)]
    artist_name: Option<String>,
    #[serde(default)]
    artwork_url100: Option<String>,
    #[serde(default)]
    preview_url: Option<String>,
}

impl SearchResult {
    /// Build a deck track, skipping entries that cannot be played
    fn into_track(self, artwork_size: &str) -> Option<Track> {
        let preview = self.preview_url.filter(|u| !u.trim().is_empty())?;
        let id = self.track_id?;

        let art = self
            .artwork_url100
            .map(|url| url.replace(SOURCE_ARTWORK, artwork_size))
            .unwrap_or_default();

        Some(
            Track::new(
                id.to_string(),
                self.track_name.unwrap_or_default(),
                self.artist_name.unwrap_or_default(),
            )
            .with_album_art(art)
            .with_preview(preview),
        )
    }
}

/// Collapse runs of whitespace so the term encodes as `a+b+c`
pub fn normalize_term(term: &str) -> String {
    term.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// iTunes Search API client
pub struct ITunesClient {
    client: Client,
    search_url: String,
    page_size: u32,
}

impl ITunesClient {
    pub fn new(search_url: impl Into<String>, page_size: u32, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build catalog http client")?;

        Ok(Self {
            client,
            search_url: search_url.into(),
            page_size,
        })
    }

    async fn fetch(&self, term: &str, limit: u32) -> Result<SearchResponse> {
        let limit = limit.to_string();
        let resp = self
            .client
            .get(&self.search_url)
            .query(&[
                ("term", term),
                ("entity", "song"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body = resp
            .json::<SearchResponse>()
            .await
            .context("Undecodable catalog response")?;

        Ok(body)
    }
}

#[async_trait]
impl CatalogSearch for ITunesClient {
    async fn search_by_query(&self, term: &str) -> Vec<Track> {
        let term = normalize_term(term);
        if term.is_empty() {
            return Vec::new();
        }

        match self.fetch(&term, self.page_size).await {
            Ok(body) => {
                let tracks: Vec<Track> = body
                    .results
                    .into_iter()
                    .filter_map(|r| r.into_track(BATCH_ARTWORK))
                    .collect();
                debug!("catalog search '{}' -> {} playable", term, tracks.len());
                tracks
            }
            Err(e) => {
                error!("iTunes search failed for \"{}\": {:#}", term, e);
                Vec::new()
            }
        }
    }

    async fn search_by_title_artist(&self, title: &str, artist: &str) -> Option<Track> {
        let term = normalize_term(&format!("{} {}", title, artist));

        match self.fetch(&term, 1).await {
            // only the top hit counts, even when it has no preview
            Ok(body) => body
                .results
                .into_iter()
                .next()
                .and_then(|r| r.into_track(SINGLE_ARTWORK)),
            Err(e) => {
                error!("iTunes search failed for \"{}\": {:#}", title, e);
                None
            }
        }
    }
}
