//! In-process fakes for the outbound adapters

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::api::AppState;
use crate::config::SpotifySettings;
use crate::core::SpotifyConnect;
use crate::db::{DbEngine, UserTable};
use crate::models::{TokenGrant, Track, User};
use crate::plugins::{CatalogSearch, LanguageModel, ResourceResponse, SpotifyApi};
use crate::stores::SessionStore;
use crate::utils::auth::create_jwt;
use crate::utils::dates;

pub const TEST_SERVER_ID: &str = "test-server-id";

pub fn grant(access: &str, refresh: Option<&str>, expires_in: i64) -> TokenGrant {
    TokenGrant {
        access_token: access.to_string(),
        refresh_token: refresh.map(String::from),
        expires_in,
        scope: None,
    }
}

/// Catalog answering from fixed tables
#[derive(Default)]
pub struct FakeCatalog {
    queries: HashMap<String, Vec<Track>>,
    lookups: HashMap<(String, String), Track>,
    query_calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, term: &str, tracks: Vec<Track>) -> Self {
        self.queries.insert(term.to_string(), tracks);
        self
    }

    pub fn with_lookup(mut self, title: &str, artist: &str, track: Track) -> Self {
        self.lookups
            .insert((title.to_string(), artist.to_string()), track);
        self
    }

    /// Same tracks for every query, handy for random seed genres
    pub fn with_any_query(mut self, tracks: Vec<Track>) -> Self {
        for genre in crate::core::seed::SEED_GENRES {
            self.queries.insert(genre.to_string(), tracks.clone());
        }
        self
    }

    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogSearch for FakeCatalog {
    async fn search_by_query(&self, term: &str) -> Vec<Track> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        self.queries.get(term).cloned().unwrap_or_default()
    }

    async fn search_by_title_artist(&self, title: &str, artist: &str) -> Option<Track> {
        self.lookups
            .get(&(title.to_string(), artist.to_string()))
            .cloned()
    }
}

/// Model returning a canned answer
pub struct FakeModel {
    text: Option<String>,
    json: Option<String>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl FakeModel {
    pub fn text(answer: &str) -> Self {
        Self {
            text: Some(answer.to_string()),
            json: None,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn json(answer: &str) -> Self {
        Self {
            text: None,
            json: Some(answer.to_string()),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            text: None,
            json: None,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().clone()
    }

    fn answer(&self, prompt: &str, answer: &Option<String>) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock() = Some(prompt.to_string());
        answer.clone().ok_or_else(|| anyhow!("model unavailable"))
    }
}

#[async_trait]
impl LanguageModel for FakeModel {
    async fn generate_text(&self, prompt: &str) -> Result<String> {
        self.answer(prompt, &self.text)
    }

    async fn generate_json(&self, prompt: &str, _schema: &Value) -> Result<String> {
        self.answer(prompt, &self.json)
    }
}

/// Spotify accounts and API double.
///
/// Tokens issued by the refresh grant are accepted automatically.
#[derive(Default)]
pub struct FakeSpotify {
    exchange: Mutex<Option<TokenGrant>>,
    refresh: Mutex<Option<TokenGrant>>,
    refresh_delay: Mutex<Option<Duration>>,
    responses: Mutex<HashMap<String, Value>>,
    accepted: Mutex<HashSet<String>>,
    reject_all: Mutex<bool>,
    used: Mutex<Vec<String>>,
    exchange_calls: AtomicUsize,
    refresh_calls: AtomicUsize,
}

impl FakeSpotify {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_exchange(&self, grant: TokenGrant) {
        *self.exchange.lock() = Some(grant);
    }

    pub fn set_refresh(&self, grant: TokenGrant) {
        *self.refresh.lock() = Some(grant);
    }

    pub fn set_refresh_delay(&self, delay: Duration) {
        *self.refresh_delay.lock() = Some(delay);
    }

    pub fn set_response(&self, path: &str, body: Value) {
        self.responses.lock().insert(path.to_string(), body);
    }

    pub fn accept(&self, token: &str) {
        self.accepted.lock().insert(token.to_string());
    }

    pub fn reject_all(&self) {
        *self.reject_all.lock() = true;
    }

    pub fn tokens_used(&self) -> Vec<String> {
        self.used.lock().clone()
    }

    pub fn exchange_calls(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpotifyApi for FakeSpotify {
    async fn exchange_code(&self, _code: &str, _redirect_uri: &str) -> Result<TokenGrant> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        let grant = self
            .exchange
            .lock()
            .clone()
            .ok_or_else(|| anyhow!("invalid_grant"))?;
        self.accept(&grant.access_token);
        Ok(grant)
    }

    async fn refresh_token(&self, _refresh_token: &str) -> Result<TokenGrant> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);

        let delay = *self.refresh_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let grant = self
            .refresh
            .lock()
            .clone()
            .ok_or_else(|| anyhow!("invalid_grant"))?;
        self.accept(&grant.access_token);
        Ok(grant)
    }

    async fn get(
        &self,
        path: &str,
        _query: &[(&str, String)],
        access_token: &str,
    ) -> Result<ResourceResponse> {
        self.used.lock().push(access_token.to_string());

        if *self.reject_all.lock() || !self.accepted.lock().contains(access_token) {
            return Ok(ResourceResponse::Unauthorized);
        }

        self.responses
            .lock()
            .get(path)
            .cloned()
            .map(ResourceResponse::Ok)
            .ok_or_else(|| anyhow!("no canned response for {}", path))
    }
}

pub fn spotify_settings() -> SpotifySettings {
    SpotifySettings {
        client_id: "client".to_string(),
        client_secret: "secret".to_string(),
        redirect_uri: "http://localhost:1971/api/spotify/callback".to_string(),
        success_redirect: "http://localhost:3000/".to_string(),
        failure_redirect: "http://localhost:3000/spotify-error".to_string(),
        authorize_url: "https://accounts.spotify.com/authorize".to_string(),
    }
}

/// Adapters behind a test app
pub struct TestDeps {
    pub catalog: Arc<FakeCatalog>,
    pub model: Arc<FakeModel>,
    pub spotify: Arc<FakeSpotify>,
    pub settings: Option<SpotifySettings>,
}

impl Default for TestDeps {
    fn default() -> Self {
        Self {
            catalog: Arc::new(FakeCatalog::new()),
            model: Arc::new(FakeModel::failing()),
            spotify: Arc::new(FakeSpotify::new()),
            settings: Some(spotify_settings()),
        }
    }
}

/// App state over an in-memory database; swipes commit immediately
pub async fn app_state(deps: TestDeps) -> actix_web::web::Data<AppState> {
    let db = DbEngine::in_memory().await.unwrap();
    let sessions = SessionStore::new(deps.catalog, deps.model, Duration::ZERO);
    let spotify = SpotifyConnect::new(db.clone(), deps.spotify, deps.settings);

    actix_web::web::Data::new(AppState {
        db,
        server_id: TEST_SERVER_ID.to_string(),
        sessions,
        spotify,
    })
}

/// Create a user and return its id with an Authorization header value
pub async fn bearer_for(state: &AppState, username: &str) -> (i64, String) {
    let user = User::new(username.to_string(), "hash".to_string());
    let user_id = UserTable::insert(&state.db, &user).await.unwrap();
    let token = create_jwt(user_id, username, &state.server_id, dates::now()).unwrap();
    (user_id, format!("Bearer {}", token))
}
