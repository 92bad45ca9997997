//! Liked songs routes

use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};

use super::auth::require_user;
use super::AppState;
use crate::errors::AppError;

#[get("")]
pub async fn get_likes(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&state, &req).await?;
    Ok(HttpResponse::Ok().json(state.sessions.likes(user.id)))
}

#[delete("/{id}")]
pub async fn delete_liked(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&state, &req).await?;
    let likes = state.sessions.delete_liked(user.id, &path)?;
    Ok(HttpResponse::Ok().json(likes))
}

/// Titled few-sentence summary of the liked list
#[post("/vibe")]
pub async fn analyze_vibe(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&state, &req).await?;
    let vibe = state.sessions.analyze_vibe(user.id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "vibe": vibe })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_likes)
        .service(analyze_vibe)
        .service(delete_liked);
}
