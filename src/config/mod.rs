//! Configuration module for Swipeify
//!
//! This module contains the application configuration structures and path management.

mod paths;
mod user_config;

pub use paths::Paths;
pub use user_config::{SpotifySettings, UserConfig};

/// Permissions requested from Spotify on connect
pub const SPOTIFY_SCOPE: &str = "user-top-read user-read-email user-read-private";

/// Results shown per page when searching for friend suggestions
pub const SUGGEST_PAGE_SIZE: usize = 6;

/// Liked tracks needed before a vibe can be summarized
pub const MIN_LIKES_FOR_VIBE: usize = 3;
