//! User model

use serde::{Deserialize, Serialize};

/// A signed-up account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Database ID
    pub id: i64,
    /// Username
    pub username: String,
    /// Password hash (not serialized to JSON)
    #[serde(skip_serializing)]
    pub password: String,
    /// Profile image url
    #[serde(default)]
    pub image: Option<String>,
    /// Unix timestamp of account creation
    #[serde(default)]
    pub created_at: i64,
}

impl User {
    /// Create a new user
    pub fn new(username: String, password_hash: String) -> Self {
        Self {
            id: 0,
            username,
            password: password_hash,
            image: None,
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Serialize without password (for API responses)
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            username: self.username.clone(),
            image: self.image.clone(),
        }
    }
}

/// Public user info (no password)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: i64,
    pub username: String,
    pub image: Option<String>,
}
