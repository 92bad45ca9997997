//! Outbound adapters
//!
//! Each external service sits behind a trait so the session and connect
//! logic can be driven by fakes in tests.

pub mod gemini;
pub mod itunes;
pub mod spotify;

pub use gemini::{GeminiClient, LanguageModel};
pub use itunes::{CatalogSearch, ITunesClient};
pub use spotify::{ResourceResponse, SpotifyApi, SpotifyHttpClient};
