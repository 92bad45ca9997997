//! Core library functions for Swipeify

pub mod connect;
pub mod deck;
pub mod discovery;
pub mod seed;
pub mod session;

pub use connect::{CallbackParams, SpotifyConnect};
