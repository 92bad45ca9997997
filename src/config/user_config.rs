//! User configuration for Swipeify
//!
//! Settings live in settings.json inside the config directory. Environment
//! variables override the file so secrets never have to be written to disk.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::Paths;

/// Environment variables that override settings.json
pub const ENV_SPOTIFY_CLIENT_ID: &str = "SPOTIFY_CLIENT_ID";
pub const ENV_SPOTIFY_CLIENT_SECRET: &str = "SPOTIFY_CLIENT_SECRET";
pub const ENV_SPOTIFY_REDIRECT_URI: &str = "SPOTIFY_REDIRECT_URI";
pub const ENV_SPOTIFY_SUCCESS_REDIRECT: &str = "SPOTIFY_SUCCESS_REDIRECT";
pub const ENV_SPOTIFY_FAILURE_REDIRECT: &str = "SPOTIFY_FAILURE_REDIRECT";
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_API_KEY: &str = "API_KEY";
pub const ENV_GEMINI_MODEL: &str = "GEMINI_MODEL";

/// User configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserConfig {
    /// Server ID used as JWT secret and password salt
    #[serde(default)]
    pub server_id: String,

    #[serde(default)]
    pub spotify_client_id: String,

    #[serde(default)]
    pub spotify_client_secret: String,

    /// Must match the redirect uri registered with Spotify
    #[serde(default)]
    pub spotify_redirect_uri: String,

    /// Where the callback sends the browser after a successful connect
    #[serde(default)]
    pub spotify_success_redirect: String,

    /// Where the callback sends the browser with a `reason` parameter
    #[serde(default)]
    pub spotify_failure_redirect: String,

    #[serde(default = "default_spotify_authorize_url")]
    pub spotify_authorize_url: String,

    #[serde(default = "default_spotify_token_url")]
    pub spotify_token_url: String,

    #[serde(default = "default_spotify_api_base")]
    pub spotify_api_base: String,

    #[serde(default)]
    pub gemini_api_key: String,

    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,

    #[serde(default = "default_catalog_search_url")]
    pub catalog_search_url: String,

    /// Results per catalog query
    #[serde(default = "default_catalog_page_size")]
    pub catalog_page_size: u32,

    /// Delay before a swiped card is retired, 0 retires immediately
    #[serde(default = "default_swipe_advance_delay_ms")]
    pub swipe_advance_delay_ms: u64,

    /// Timeout for every outbound request
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

/// Everything the connect flow needs, present only when fully configured
#[derive(Debug, Clone)]
pub struct SpotifySettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub success_redirect: String,
    pub failure_redirect: String,
    pub authorize_url: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            server_id: String::new(),
            spotify_client_id: String::new(),
            spotify_client_secret: String::new(),
            spotify_redirect_uri: String::new(),
            spotify_success_redirect: String::new(),
            spotify_failure_redirect: String::new(),
            spotify_authorize_url: default_spotify_authorize_url(),
            spotify_token_url: default_spotify_token_url(),
            spotify_api_base: default_spotify_api_base(),
            gemini_api_key: String::new(),
            gemini_model: default_gemini_model(),
            gemini_base_url: default_gemini_base_url(),
            catalog_search_url: default_catalog_search_url(),
            catalog_page_size: default_catalog_page_size(),
            swipe_advance_delay_ms: default_swipe_advance_delay_ms(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl UserConfig {
    /// Load configuration from the global config directory
    pub fn load() -> Result<Self> {
        let paths = Paths::get()?;
        Self::load_from(&paths.settings_path())
    }

    /// Load configuration from a settings file, creating it with defaults
    pub fn load_from(settings_path: &Path) -> Result<Self> {
        let mut config = if settings_path.exists() {
            let content =
                std::fs::read_to_string(settings_path).context("Failed to read settings file")?;
            serde_json::from_str(&content).context("Failed to parse settings file")?
        } else {
            Self::default()
        };

        // generate server id if missing
        if config.server_id.is_empty() {
            config.server_id = uuid::Uuid::new_v4().to_string();
            config.save_to(settings_path)?;
        }

        Ok(config)
    }

    pub fn save_to(&self, settings_path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(settings_path, content).context("Failed to write settings file")?;
        Ok(())
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok());
    }

    /// Apply overrides from any variable lookup; empty values are ignored
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_SPOTIFY_CLIENT_ID) {
            self.spotify_client_id = v;
        }
        if let Some(v) = get(ENV_SPOTIFY_CLIENT_SECRET) {
            self.spotify_client_secret = v;
        }
        if let Some(v) = get(ENV_SPOTIFY_REDIRECT_URI) {
            self.spotify_redirect_uri = v;
        }
        if let Some(v) = get(ENV_SPOTIFY_SUCCESS_REDIRECT) {
            self.spotify_success_redirect = v;
        }
        if let Some(v) = get(ENV_SPOTIFY_FAILURE_REDIRECT) {
            self.spotify_failure_redirect = v;
        }
        if let Some(v) = get(ENV_GEMINI_API_KEY).or_else(|| get(ENV_API_KEY)) {
            self.gemini_api_key = v;
        }
        if let Some(v) = get(ENV_GEMINI_MODEL) {
            self.gemini_model = v;
        }
    }

    /// Spotify connect settings, or the names of the missing ones
    pub fn spotify_settings(&self) -> std::result::Result<SpotifySettings, Vec<&'static str>> {
        let required = [
            (ENV_SPOTIFY_CLIENT_ID, &self.spotify_client_id),
            (ENV_SPOTIFY_CLIENT_SECRET, &self.spotify_client_secret),
            (ENV_SPOTIFY_REDIRECT_URI, &self.spotify_redirect_uri),
            (ENV_SPOTIFY_SUCCESS_REDIRECT, &self.spotify_success_redirect),
            (ENV_SPOTIFY_FAILURE_REDIRECT, &self.spotify_failure_redirect),
        ];

        let missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();

        if !missing.is_empty() {
            return Err(missing);
        }

        Ok(SpotifySettings {
            client_id: self.spotify_client_id.clone(),
            client_secret: self.spotify_client_secret.clone(),
            redirect_uri: self.spotify_redirect_uri.clone(),
            success_redirect: self.spotify_success_redirect.clone(),
            failure_redirect: self.spotify_failure_redirect.clone(),
            authorize_url: self.spotify_authorize_url.clone(),
        })
    }

    pub fn http_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.http_timeout_secs.max(1))
    }
}

// Default value functions for serde

fn default_spotify_authorize_url() -> String {
    "https://accounts.spotify.com/authorize".to_string()
}

fn default_spotify_token_url() -> String {
    "https://accounts.spotify.com/api/token".to_string()
}

fn default_spotify_api_base() -> String {
    "https://api.spotify.com/v1".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_catalog_search_url() -> String {
    "https://itunes.apple.com/search".to_string()
}

fn default_catalog_page_size() -> u32 {
    20
}

fn default_swipe_advance_delay_ms() -> u64 {
    100
}

fn default_http_timeout_secs() -> u64 {
    20
}
