//! Small enums shared between the session and the API

use serde::{Deserialize, Serialize};

/// The four mutually exclusive screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Swipe,
    Likes,
    Discover,
    Suggest,
}

impl Default for View {
    fn default() -> Self {
        View::Swipe
    }
}

/// Swipe direction on the active card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    /// Pass
    Left,
    /// Like
    Right,
}

/// Lifecycle of a session deck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeckStatus {
    Loading,
    Ready,
    Exhausted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_round_trip_names() {
        let view: View = serde_json::from_str("\"suggest\"").unwrap();
        assert_eq!(view, View::Suggest);
        assert_eq!(serde_json::to_string(&View::Likes).unwrap(), "\"likes\"");
        assert!(serde_json::from_str::<View>("\"settings\"").is_err());
    }

    #[test]
    fn test_direction_names() {
        let dir: SwipeDirection = serde_json::from_str("\"right\"").unwrap();
        assert_eq!(dir, SwipeDirection::Right);
    }
}
