//! Typed errors for the HTTP surface.
//!
//! Lower layers return `anyhow::Result`; handlers convert into `AppError`,
//! which renders as `{"error": <code>, "msg": <message>}` with a fitting
//! status.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Local input guard, rejected before any network call
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// No active card to act on
    #[error("No cards left. Start over to load a fresh deck.")]
    DeckExhausted,

    #[error("{0}")]
    Unauthorized(String),

    #[error("Spotify account not connected")]
    SpotifyNotConnected,

    /// Token refresh or the single retry after a 401 failed
    #[error("Spotify authorization failed. Please reconnect your account.")]
    SpotifyAuthorization,

    /// Catalog, Spotify or model endpoint unreachable or non-2xx
    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    AiUnavailable(String),

    /// Structured recommendation output could not be parsed
    #[error("Something went wrong while finding new music.")]
    MalformedAiResponse(#[source] serde_json::Error),

    #[error("Couldn't find any songs for that. Try a different search!")]
    NoSuggestions,

    #[error("Found ideas, but couldn't get song previews. Try again.")]
    NoPlayableResults,

    #[error("Server misconfigured: {0}")]
    Config(String),

    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine readable code
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::NotFound(_) => "not_found",
            AppError::DeckExhausted => "deck_exhausted",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::SpotifyNotConnected => "spotify_not_connected",
            AppError::SpotifyAuthorization => "spotify_authorization_failed",
            AppError::Upstream(_) => "upstream_unavailable",
            AppError::AiUnavailable(_) => "ai_unavailable",
            AppError::MalformedAiResponse(_) => "malformed_ai_response",
            AppError::NoSuggestions => "no_suggestions",
            AppError::NoPlayableResults => "no_playable_results",
            AppError::Config(_) => "config",
            AppError::Database(_) => "database",
            AppError::Internal(_) => "internal",
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn unauthorized() -> Self {
        AppError::Unauthorized("Not authenticated".to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) | AppError::NoSuggestions | AppError::NoPlayableResults => {
                StatusCode::NOT_FOUND
            }
            AppError::DeckExhausted | AppError::SpotifyNotConnected => StatusCode::CONFLICT,
            AppError::Unauthorized(_) | AppError::SpotifyAuthorization => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Upstream(_)
            | AppError::AiUnavailable(_)
            | AppError::MalformedAiResponse(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Database(e) => tracing::error!("database error: {}", e),
            AppError::Internal(e) => tracing::error!("internal error: {:#}", e),
            AppError::MalformedAiResponse(e) => {
                tracing::error!("unparseable recommendation payload: {}", e)
            }
            _ => {}
        }

        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.code(),
            "msg": self.to_string(),
        }))
    }
}
