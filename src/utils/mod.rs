//! Utility modules for Swipeify

pub mod auth;
pub mod dates;
