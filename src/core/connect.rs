//! Spotify account connection
//!
//! Authorization code flow with a single-use state token, token storage,
//! single-flight refresh per user and the read-only account panels.

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::{SpotifySettings, SPOTIFY_SCOPE};
use crate::db::{AuthStateTable, DbEngine, SpotifyTokenTable};
use crate::errors::AppError;
use crate::models::{
    ConnectionStatus, RawPage, RawProfile, RawTopArtist, RawTopTrack, SpotifyArtist,
    SpotifyOverview, SpotifyProfile, SpotifyTrack, TokenRecord,
};
use crate::plugins::{ResourceResponse, SpotifyApi};
use crate::utils::auth::generate_state_token;
use crate::utils::dates;

/// A token with less validity left than this is refreshed first
const REFRESH_MARGIN_SECS: i64 = 60;
const DEFAULT_TOP_LIMIT: u32 = 10;
const PANEL_ERROR: &str = "Unable to load Spotify data";

/// Why a callback did not connect the account
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackFailure {
    MissingState,
    InvalidState,
    /// Error reported by Spotify, e.g. `access_denied`
    Provider(String),
    MissingCode,
    TokenExchangeFailed,
}

impl CallbackFailure {
    /// Value of the `reason` query parameter
    pub fn reason(&self) -> String {
        match self {
            CallbackFailure::MissingState => "missing_state".to_string(),
            CallbackFailure::InvalidState => "invalid_state".to_string(),
            CallbackFailure::Provider(error) => format!("spotify_{}", error),
            CallbackFailure::MissingCode => "missing_code".to_string(),
            CallbackFailure::TokenExchangeFailed => "token_exchange_failed".to_string(),
        }
    }
}

/// Query parameters Spotify sends to the redirect uri
#[derive(Debug, Default, Clone, serde::Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Treat empty query values as absent
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

pub struct SpotifyConnect {
    db: DbEngine,
    api: Arc<dyn SpotifyApi>,
    settings: Option<SpotifySettings>,
    refresh_locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl SpotifyConnect {
    pub fn new(db: DbEngine, api: Arc<dyn SpotifyApi>, settings: Option<SpotifySettings>) -> Self {
        Self {
            db,
            api,
            settings,
            refresh_locks: DashMap::new(),
        }
    }

    pub fn settings(&self) -> Result<&SpotifySettings, AppError> {
        self.settings
            .as_ref()
            .ok_or_else(|| AppError::Config("Spotify credentials are not configured".to_string()))
    }

    /// Build the consent page url for a state token
    pub fn authorize_url(settings: &SpotifySettings, state: &str) -> Result<String, AppError> {
        let url = reqwest::Url::parse_with_params(
            &settings.authorize_url,
            &[
                ("response_type", "code"),
                ("client_id", settings.client_id.as_str()),
                ("redirect_uri", settings.redirect_uri.as_str()),
                ("scope", SPOTIFY_SCOPE),
                ("state", state),
            ],
        )
        .map_err(|e| AppError::Config(format!("Invalid Spotify authorize url: {}", e)))?;

        Ok(url.to_string())
    }

    /// Mint and store a state token, returning the consent page url
    pub async fn start(&self, user_id: i64) -> Result<String, AppError> {
        let settings = self.settings()?;
        let state = generate_state_token();

        AuthStateTable::insert(&self.db, &state, user_id, dates::now()).await?;
        debug!("Issued Spotify state for user {}", user_id);

        Self::authorize_url(settings, &state)
    }

    /// Run the callback checks in order and store the tokens on success
    pub async fn handle_callback(&self, params: &CallbackParams) -> Result<i64, CallbackFailure> {
        self.handle_callback_at(params, dates::now()).await
    }

    pub async fn handle_callback_at(
        &self,
        params: &CallbackParams,
        now: i64,
    ) -> Result<i64, CallbackFailure> {
        let state = present(&params.state).ok_or(CallbackFailure::MissingState)?;

        // the state is spent even when a later check fails
        let user_id = match AuthStateTable::consume(&self.db, state).await {
            Ok(Some(user_id)) => user_id,
            Ok(None) => return Err(CallbackFailure::InvalidState),
            Err(e) => {
                error!("Consuming Spotify state failed: {:#}", e);
                return Err(CallbackFailure::InvalidState);
            }
        };

        if let Some(error) = present(&params.error) {
            return Err(CallbackFailure::Provider(error.to_string()));
        }

        let code = present(&params.code).ok_or(CallbackFailure::MissingCode)?;

        self.exchange_and_store(user_id, code, now).await.map_err(|e| {
            error!("Spotify token exchange failed for user {}: {:#}", user_id, e);
            CallbackFailure::TokenExchangeFailed
        })?;

        info!("Connected Spotify account for user {}", user_id);
        Ok(user_id)
    }

    async fn exchange_and_store(&self, user_id: i64, code: &str, now: i64) -> anyhow::Result<()> {
        let settings = self
            .settings
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Spotify credentials are not configured"))?;

        let grant = self.api.exchange_code(code, &settings.redirect_uri).await?;
        let refresh_token = grant
            .refresh_token
            .ok_or_else(|| anyhow::anyhow!("Token response had no refresh token"))?;

        let record = TokenRecord {
            user_id,
            access_token: grant.access_token,
            refresh_token,
            expires_at: now + grant.expires_in,
            scope: grant.scope,
        };
        SpotifyTokenTable::upsert(&self.db, &record).await
    }

    /// Where the browser goes after the callback
    pub fn callback_location(
        &self,
        outcome: &Result<i64, CallbackFailure>,
    ) -> Result<String, AppError> {
        let settings = self.settings()?;

        let (base, param) = match outcome {
            Ok(_) => (&settings.success_redirect, ("connected", "true".to_string())),
            Err(failure) => (&settings.failure_redirect, ("reason", failure.reason())),
        };

        let mut url = reqwest::Url::parse(base)
            .map_err(|e| AppError::Config(format!("Invalid Spotify redirect url: {}", e)))?;
        url.query_pairs_mut().append_pair(param.0, &param.1);

        Ok(url.to_string())
    }

    pub async fn connection_status(&self, user_id: i64) -> Result<ConnectionStatus, AppError> {
        let record = SpotifyTokenTable::get(&self.db, user_id).await?;
        Ok(match record {
            Some(_) => ConnectionStatus::Connected,
            None => ConnectionStatus::NotConnected,
        })
    }

    /// Forget the stored tokens
    pub async fn disconnect(&self, user_id: i64) -> Result<bool, AppError> {
        Ok(SpotifyTokenTable::delete(&self.db, user_id).await?)
    }

    /// Return a token valid for at least the refresh margin.
    ///
    /// `rejected` is an access token the API just answered 401 for; it is
    /// refreshed even if it looks valid. Concurrent callers for the same user
    /// share one refresh: the record is re-read under the user's lock.
    pub async fn ensure_valid_access_token_at(
        &self,
        user_id: i64,
        now: i64,
        rejected: Option<&str>,
    ) -> Result<TokenRecord, AppError> {
        let is_usable = |record: &TokenRecord| {
            record.remaining(now) > REFRESH_MARGIN_SECS
                && rejected.map_or(true, |bad| bad != record.access_token)
        };

        let record = SpotifyTokenTable::get(&self.db, user_id)
            .await?
            .ok_or(AppError::SpotifyNotConnected)?;
        if is_usable(&record) {
            return Ok(record);
        }

        let lock = self
            .refresh_locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        let record = SpotifyTokenTable::get(&self.db, user_id)
            .await?
            .ok_or(AppError::SpotifyNotConnected)?;
        if is_usable(&record) {
            debug!("Spotify token for user {} was refreshed by another request", user_id);
            return Ok(record);
        }

        let grant = self
            .api
            .refresh_token(&record.refresh_token)
            .await
            .map_err(|e| {
                warn!("Spotify refresh failed for user {}: {:#}", user_id, e);
                AppError::SpotifyAuthorization
            })?;

        let refreshed = TokenRecord {
            user_id,
            access_token: grant.access_token,
            // rotate only when a new one is issued
            refresh_token: grant.refresh_token.unwrap_or(record.refresh_token),
            expires_at: now + grant.expires_in,
            scope: grant.scope.or(record.scope),
        };
        SpotifyTokenTable::upsert(&self.db, &refreshed).await?;
        debug!("Refreshed Spotify token for user {}", user_id);

        Ok(refreshed)
    }

    /// GET a resource, retrying once with a fresh token after a 401
    async fn fetch_resource(
        &self,
        user_id: i64,
        path: &str,
        query: &[(&str, String)],
        now: i64,
    ) -> Result<Value, AppError> {
        let token = self.ensure_valid_access_token_at(user_id, now, None).await?;

        if let ResourceResponse::Ok(json) = self.get(path, query, &token.access_token).await? {
            return Ok(json);
        }

        debug!("Spotify rejected token for user {}, refreshing", user_id);
        let token = self
            .ensure_valid_access_token_at(user_id, now, Some(&token.access_token))
            .await?;

        match self.get(path, query, &token.access_token).await? {
            ResourceResponse::Ok(json) => Ok(json),
            ResourceResponse::Unauthorized => Err(AppError::SpotifyAuthorization),
        }
    }

    async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
        access_token: &str,
    ) -> Result<ResourceResponse, AppError> {
        self.api.get(path, query, access_token).await.map_err(|e| {
            error!("Spotify request {} failed: {:#}", path, e);
            AppError::Upstream(PANEL_ERROR.to_string())
        })
    }

    async fn fetch_as<T: DeserializeOwned>(
        &self,
        user_id: i64,
        path: &str,
        query: &[(&str, String)],
        now: i64,
    ) -> Result<T, AppError> {
        let json = self.fetch_resource(user_id, path, query, now).await?;
        serde_json::from_value(json).map_err(|e| {
            error!("Unexpected Spotify payload from {}: {}", path, e);
            AppError::Upstream(PANEL_ERROR.to_string())
        })
    }

    pub async fn profile(&self, user_id: i64) -> Result<SpotifyProfile, AppError> {
        self.profile_at(user_id, dates::now()).await
    }

    pub async fn profile_at(&self, user_id: i64, now: i64) -> Result<SpotifyProfile, AppError> {
        let raw: RawProfile = self.fetch_as(user_id, "/me", &[], now).await?;
        Ok(raw.into())
    }

    pub async fn top_tracks(
        &self,
        user_id: i64,
        limit: Option<u32>,
    ) -> Result<Vec<SpotifyTrack>, AppError> {
        self.top_tracks_at(user_id, limit, dates::now()).await
    }

    pub async fn top_tracks_at(
        &self,
        user_id: i64,
        limit: Option<u32>,
        now: i64,
    ) -> Result<Vec<SpotifyTrack>, AppError> {
        let query = [("limit", clamp_limit(limit).to_string())];
        let page: RawPage<RawTopTrack> =
            self.fetch_as(user_id, "/me/top/tracks", &query, now).await?;
        Ok(page.items.into_iter().map(Into::into).collect())
    }

    pub async fn top_artists(
        &self,
        user_id: i64,
        limit: Option<u32>,
    ) -> Result<Vec<SpotifyArtist>, AppError> {
        self.top_artists_at(user_id, limit, dates::now()).await
    }

    pub async fn top_artists_at(
        &self,
        user_id: i64,
        limit: Option<u32>,
        now: i64,
    ) -> Result<Vec<SpotifyArtist>, AppError> {
        let query = [("limit", clamp_limit(limit).to_string())];
        let page: RawPage<RawTopArtist> =
            self.fetch_as(user_id, "/me/top/artists", &query, now).await?;
        Ok(page.items.into_iter().map(Into::into).collect())
    }

    /// All three panels at once; one failure fails the whole overview
    pub async fn overview(&self, user_id: i64) -> Result<SpotifyOverview, AppError> {
        let now = dates::now();
        let (profile, tracks, artists) = tokio::try_join!(
            self.profile_at(user_id, now),
            self.top_tracks_at(user_id, None, now),
            self.top_artists_at(user_id, None, now),
        )
        .map_err(|e| match e {
            AppError::SpotifyNotConnected | AppError::SpotifyAuthorization => e,
            _ => AppError::Upstream(PANEL_ERROR.to_string()),
        })?;

        Ok(SpotifyOverview {
            profile,
            tracks,
            artists,
        })
    }
}

/// Spotify accepts 1..=50 items per page
fn clamp_limit(limit: Option<u32>) -> u32 {
    limit.unwrap_or(DEFAULT_TOP_LIMIT).clamp(1, 50)
}
