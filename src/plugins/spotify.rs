//! Spotify accounts and Web API adapter
//!
//! Only transport lives here. Token bookkeeping and the retry policy are in
//! `core::connect`.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::error;

use crate::models::TokenGrant;

/// Outcome of an authorized resource read
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceResponse {
    Ok(Value),
    /// The access token was rejected
    Unauthorized,
}

#[async_trait]
pub trait SpotifyApi: Send + Sync {
    /// authorization_code grant
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenGrant>;

    /// refresh_token grant
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenGrant>;

    /// GET `{api_base}{path}` with a bearer token
    async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
        access_token: &str,
    ) -> Result<ResourceResponse>;
}

pub struct SpotifyHttpClient {
    client: Client,
    client_id: String,
    client_secret: String,
    token_url: String,
    api_base: String,
}

impl SpotifyHttpClient {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        token_url: impl Into<String>,
        api_base: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build Spotify http client")?;

        Ok(Self {
            client,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_url: token_url.into(),
            api_base: api_base.into(),
        })
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenGrant> {
        let resp = self
            .client
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(form)
            .send()
            .await
            .context("Spotify token request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!("Spotify token endpoint returned {}: {}", status, body);
            return Err(anyhow!("Spotify token endpoint returned {}", status));
        }

        resp.json::<TokenGrant>()
            .await
            .context("Undecodable Spotify token response")
    }
}

#[async_trait]
impl SpotifyApi for SpotifyHttpClient {
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenGrant> {
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ])
        .await
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenGrant> {
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
        access_token: &str,
    ) -> Result<ResourceResponse> {
        let url = format!("{}{}", self.api_base.trim_end_matches('/'), path);

        let resp = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Spotify request to {} failed", path))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Ok(ResourceResponse::Unauthorized);
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!("Spotify request failed url={} status={} body={}", url, status, body);
            return Err(anyhow!("Failed to fetch Spotify resource"));
        }

        let json = resp
            .json::<Value>()
            .await
            .context("Undecodable Spotify response")?;

        Ok(ResourceResponse::Ok(json))
    }
}
