//! Authentication utilities

use anyhow::Result;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use pbkdf2::pbkdf2_hmac;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

const PBKDF2_ITERATIONS: u32 = 100_000;
const HASH_LENGTH: usize = 32;

/// Access tokens live for thirty days
pub const ACCESS_TOKEN_TTL_SECS: i64 = 30 * 24 * 60 * 60;

/// Length of an OAuth state token
pub const STATE_TOKEN_LENGTH: usize = 32;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// user id
    pub sub: i64,
    pub username: String,
    pub exp: usize,
}

/// hash a password using pbkdf2-sha256 salted with the server id
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hash = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(
        password.as_bytes(),
        salt.as_bytes(),
        PBKDF2_ITERATIONS,
        &mut hash,
    );

    hex::encode(hash)
}

/// verify a password against a hash using constant-time comparison
pub fn verify_password(password: &str, salt: &str, hash: &str) -> bool {
    let computed_hash = hash_password(password, salt);
    computed_hash.as_bytes().ct_eq(hash.as_bytes()).into()
}

/// generate a random string from the given charset
fn random_from(charset: &[u8], length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..charset.len());
            charset[idx] as char
        })
        .collect()
}

/// lowercase alphanumeric state binding an authorize redirect to its user
pub fn generate_state_token() -> String {
    random_from(b"abcdefghijklmnopqrstuvwxyz0123456789", STATE_TOKEN_LENGTH)
}

/// create an HS256 access token for the user
pub fn create_jwt(user_id: i64, username: &str, secret: &str, now: i64) -> Result<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (now + ACCESS_TOKEN_TTL_SECS) as usize,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// verify an access token, rejecting expired ones
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}
