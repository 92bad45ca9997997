//! REST API routes for Swipeify

pub mod auth;
pub mod deck;
pub mod discover;
pub mod likes;
pub mod spotify;
pub mod suggest;
pub mod view;

use actix_web::web;

use crate::core::SpotifyConnect;
use crate::db::DbEngine;
use crate::stores::SessionStore;

/// Shared state handed to every handler
pub struct AppState {
    pub db: DbEngine,
    /// Signs access tokens and salts password hashes
    pub server_id: String,
    pub sessions: SessionStore,
    pub spotify: SpotifyConnect,
}

/// Configure all API routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Auth routes
        .service(web::scope("/auth").configure(auth::configure))
        // Spotify connection routes
        .service(web::scope("/api/spotify").configure(spotify::configure))
        // Swipe deck routes
        .service(web::scope("/deck").configure(deck::configure))
        // Liked songs and vibe routes
        .service(web::scope("/likes").configure(likes::configure))
        // AI discovery routes
        .service(web::scope("/discover").configure(discover::configure))
        // Friend suggestion routes
        .service(web::scope("/suggest").configure(suggest::configure))
        // View router
        .service(web::scope("/view").configure(view::configure));
}
