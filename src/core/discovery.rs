//! Vibe analysis and AI-driven discovery
//!
//! Prompts are built here; the model and catalog are reached only through
//! their traits.

use futures::future::join_all;
use serde_json::{json, Value};
use std::collections::BTreeSet;
use tracing::{error, info};

use crate::config::MIN_LIKES_FOR_VIBE;
use crate::errors::AppError;
use crate::models::{SongIdea, Track};
use crate::plugins::{CatalogSearch, LanguageModel};

/// Songs requested per discovery call
const RECOMMENDATION_COUNT: usize = 10;

pub fn vibe_prompt(liked: &[Track]) -> String {
    let song_list = liked
        .iter()
        .map(|t| format!("- {}", t.quoted()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a cool, knowledgeable music critic and DJ.\n\
         A user has created a playlist by swiping right on the following songs:\n\
         {}\n\n\
         Based on this playlist, analyze the user's music vibe.\n\
         Describe the overall mood, potential genres they enjoy, and the type of energy their playlist gives off.\n\
         Keep it concise, fun, and engaging, around 3-4 sentences.\n\
         Start with a catchy title for their vibe. For example: \"Your Vibe: Sunset Chillwave\" or \"Your Vibe: Energetic Pop Powerhouse\".\n\
         Do not use markdown formatting.",
        song_list
    )
}

pub fn recommendation_prompt(request: &str, excluded: &BTreeSet<String>) -> String {
    let exclusion = if excluded.is_empty() {
        String::new()
    } else {
        let artists = excluded.iter().cloned().collect::<Vec<_>>().join(", ");
        format!(
            "\nCrucially, DO NOT recommend any songs by the following artists: {}.",
            artists
        )
    };

    format!(
        "You are a music discovery expert with deep knowledge of Spotify's catalog and trends. \
         A user wants to find new music based on the following prompt: \"{}\".\n\
         Suggest a list of {} songs that match this prompt, basing your recommendations on popular and relevant tracks from Spotify.\
         {}\n\
         Return your response as a valid JSON array of objects, where each object has a \"title\" and \"artist\" property.\n\
         Do not include any other text, explanations, or markdown formatting. Just the JSON array.",
        request, RECOMMENDATION_COUNT, exclusion
    )
}

/// Discovery request built from the liked list
pub fn vibe_discovery_prompt(liked: &[Track]) -> Result<String, AppError> {
    if liked.is_empty() {
        return Err(AppError::validation("Like some songs first!"));
    }

    let songs = liked
        .iter()
        .map(Track::quoted)
        .collect::<Vec<_>>()
        .join(", ");
    Ok(format!("songs that have a similar vibe to these: {}", songs))
}

/// Structured output schema: an array of `{title, artist}`
pub fn recommendation_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "title": {"type": "STRING"},
                "artist": {"type": "STRING"}
            },
            "required": ["title", "artist"]
        }
    })
}

/// Strict parse of the model's JSON answer
pub fn parse_recommendations(raw: &str) -> Result<Vec<SongIdea>, AppError> {
    serde_json::from_str::<Vec<SongIdea>>(raw.trim()).map_err(AppError::MalformedAiResponse)
}

pub async fn summarize_vibe(model: &dyn LanguageModel, liked: &[Track]) -> Result<String, AppError> {
    if liked.len() < MIN_LIKES_FOR_VIBE {
        return Err(AppError::validation(format!(
            "Like at least {} songs to analyze your vibe!",
            MIN_LIKES_FOR_VIBE
        )));
    }

    let text = model.generate_text(&vibe_prompt(liked)).await.map_err(|e| {
        error!("Vibe analysis failed: {:#}", e);
        AppError::AiUnavailable("Sorry, couldn't analyze your vibe. Please try again.".to_string())
    })?;

    Ok(text.trim().to_string())
}

pub async fn recommend(
    model: &dyn LanguageModel,
    request: &str,
    excluded: &BTreeSet<String>,
) -> Result<Vec<SongIdea>, AppError> {
    let prompt = recommendation_prompt(request, excluded);

    let raw = model
        .generate_json(&prompt, &recommendation_schema())
        .await
        .map_err(|e| {
            error!("Getting song recommendations failed: {:#}", e);
            AppError::AiUnavailable("Something went wrong while finding new music.".to_string())
        })?;

    parse_recommendations(&raw)
}

/// Look every idea up concurrently; unresolved and excluded songs are dropped
pub async fn resolve(
    catalog: &dyn CatalogSearch,
    ideas: &[SongIdea],
    excluded: &BTreeSet<String>,
) -> Vec<Track> {
    let lookups = ideas
        .iter()
        .map(|idea| catalog.search_by_title_artist(&idea.title, &idea.artist));

    join_all(lookups)
        .await
        .into_iter()
        .flatten()
        .filter(|t| !excluded.contains(&t.artist))
        .collect()
}

/// Prompt to playable tracks, ready to append to a deck
pub async fn discover(
    model: &dyn LanguageModel,
    catalog: &dyn CatalogSearch,
    request: &str,
    excluded: &BTreeSet<String>,
) -> Result<Vec<Track>, AppError> {
    let request = request.trim();
    if request.is_empty() {
        return Err(AppError::validation("Describe what you'd like to hear."));
    }

    let ideas = recommend(model, request, excluded).await?;
    if ideas.is_empty() {
        return Err(AppError::NoSuggestions);
    }

    let tracks = resolve(catalog, &ideas, excluded).await;
    info!(
        "Discovery resolved {} of {} suggestions",
        tracks.len(),
        ideas.len()
    );

    if tracks.is_empty() {
        return Err(AppError::NoPlayableResults);
    }
    Ok(tracks)
}
