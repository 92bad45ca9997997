//! Swipeify - swipe through song previews, build a liked list and discover
//! new music with AI, optionally connected to a Spotify account.

mod api;
mod config;
mod core;
mod db;
mod errors;
mod models;
mod plugins;
mod stores;
mod utils;

#[cfg(test)]
mod testing;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::api::AppState;
use crate::config::{Paths, UserConfig};
use crate::core::SpotifyConnect;
use crate::db::{run_migrations, AuthStateTable, DbEngine};
use crate::plugins::{GeminiClient, ITunesClient, SpotifyHttpClient};
use crate::stores::SessionStore;
use crate::utils::dates;

/// Swipeify - music discovery server
#[derive(Parser, Debug)]
#[command(name = "swipeify")]
#[command(version)]
#[command(about = "Swipe through song previews and discover music with AI")]
struct Args {
    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 1971)]
    port: u16,

    /// Enable debug mode
    #[arg(long)]
    debug: bool,

    /// Path to config directory
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // keep dependency chatter out of the log
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::new(format!(
        "{},sqlx=warn,hyper=warn,reqwest=warn",
        log_level
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    info!("Swipeify v{} starting...", env!("CARGO_PKG_VERSION"));

    let paths = Paths::init(args.config)?;
    info!("Config directory: {:?}", paths.config_dir());

    let mut config = UserConfig::load()?;
    config.apply_env();

    start_swipeify(args.host, args.port, config, &paths).await
}

async fn start_swipeify(host: String, port: u16, config: UserConfig, paths: &Paths) -> Result<()> {
    info!("Opening database...");
    let db = DbEngine::connect(&paths.app_db_path()).await?;
    run_migrations(&db).await?;

    // unused state tokens from abandoned connects
    let pruned = AuthStateTable::prune_older_than(&db, dates::get_timestamp_days_ago(1)).await?;
    if pruned > 0 {
        info!("Pruned {} stale Spotify state tokens", pruned);
    }

    let state = web::Data::new(build_state(db, &config)?);

    let addr = format!("{}:{}", host, port);
    info!("Server listening on http://{}", addr);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(api::configure)
    })
    .bind(addr)?
    .run()
    .await?;

    Ok(())
}

fn build_state(db: DbEngine, config: &UserConfig) -> Result<AppState> {
    let timeout = config.http_timeout();

    let catalog = ITunesClient::new(&config.catalog_search_url, config.catalog_page_size, timeout)?;

    let model = GeminiClient::new(
        &config.gemini_api_key,
        &config.gemini_model,
        &config.gemini_base_url,
        timeout,
    )?;
    if !model.is_configured() {
        warn!("GEMINI_API_KEY is not set. Vibe analysis and discovery will fail.");
    }

    let settings = match config.spotify_settings() {
        Ok(settings) => Some(settings),
        Err(missing) => {
            warn!(
                "Spotify connect disabled, missing: {}",
                missing.join(", ")
            );
            None
        }
    };

    let spotify_api = SpotifyHttpClient::new(
        &config.spotify_client_id,
        &config.spotify_client_secret,
        &config.spotify_token_url,
        &config.spotify_api_base,
        timeout,
    )?;

    let sessions = SessionStore::new(
        Arc::new(catalog),
        Arc::new(model),
        Duration::from_millis(config.swipe_advance_delay_ms),
    );
    let spotify = SpotifyConnect::new(db.clone(), Arc::new(spotify_api), settings);

    Ok(AppState {
        db,
        server_id: config.server_id.clone(),
        sessions,
        spotify,
    })
}
