//! authentication api routes, cookie or bearer jwt

use actix_web::cookie::{time::Duration as CookieDuration, Cookie};
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use serde::Deserialize;
use tracing::info;

use super::AppState;
use crate::db::UserTable;
use crate::errors::AppError;
use crate::models::User;
use crate::utils::auth::{
    create_jwt, hash_password, verify_jwt, verify_password, ACCESS_TOKEN_TTL_SECS,
};
use crate::utils::dates;

pub const ACCESS_COOKIE: &str = "access_token_cookie";

const MIN_PASSWORD_LENGTH: usize = 6;

/// login and signup request
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// signup endpoint
#[post("/signup")]
pub async fn signup(
    state: web::Data<AppState>,
    body: web::Json<Credentials>,
) -> Result<HttpResponse, AppError> {
    let username = body.username.trim();
    if username.is_empty() {
        return Err(AppError::validation("Username cannot be empty"));
    }
    if body.password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    if UserTable::exists(&state.db, username).await? {
        return Err(AppError::validation("Username already taken"));
    }

    let hash = hash_password(&body.password, &state.server_id);
    let mut user = User::new(username.to_string(), hash);
    user.id = UserTable::insert(&state.db, &user).await?;
    info!("Created user {}", user.username);

    login_response(&state, &user)
}

/// login endpoint
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<Credentials>,
) -> Result<HttpResponse, AppError> {
    let user = UserTable::get_by_username(&state.db, body.username.trim())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if !verify_password(&body.password, &state.server_id, &user.password) {
        return Err(AppError::Unauthorized("Invalid password".to_string()));
    }

    login_response(&state, &user)
}

/// current user or an empty object
#[get("/user")]
pub async fn get_logged_in_user(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    match auth_user_optional(&state, &req).await? {
        Some(user) => Ok(HttpResponse::Ok().json(user.to_public())),
        None => Ok(HttpResponse::Ok().json(serde_json::json!({}))),
    }
}

/// logout
#[get("/logout")]
pub async fn logout() -> HttpResponse {
    let cookie = Cookie::build(ACCESS_COOKIE, "")
        .path("/")
        .max_age(CookieDuration::seconds(0))
        .http_only(true)
        .finish();

    HttpResponse::Ok().cookie(cookie).json(serde_json::json!({
        "msg": "Logged out"
    }))
}

// helpers

fn login_response(state: &AppState, user: &User) -> Result<HttpResponse, AppError> {
    let token = create_jwt(user.id, &user.username, &state.server_id, dates::now())?;

    Ok(HttpResponse::Ok()
        .cookie(build_access_cookie(&token))
        .json(serde_json::json!({
            "msg": format!("Logged in as {}", user.username),
            "accesstoken": token,
            "maxage": ACCESS_TOKEN_TTL_SECS,
            "user": user.to_public(),
        })))
}

fn build_access_cookie(token: &str) -> Cookie<'static> {
    Cookie::build(ACCESS_COOKIE, token.to_string())
        .path("/")
        .http_only(true)
        .max_age(CookieDuration::seconds(ACCESS_TOKEN_TTL_SECS))
        .finish()
}

/// The signed-in user, or 401
pub async fn require_user(state: &AppState, req: &HttpRequest) -> Result<User, AppError> {
    let token = access_token(req)?.ok_or_else(AppError::unauthorized)?;

    let claims = verify_jwt(&token, &state.server_id)
        .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))?;

    UserTable::get_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(AppError::unauthorized)
}

/// A stale or garbled credential reads as logged out
async fn auth_user_optional(state: &AppState, req: &HttpRequest) -> Result<Option<User>, AppError> {
    match require_user(state, req).await {
        Ok(user) => Ok(Some(user)),
        Err(AppError::Unauthorized(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

fn bearer_token(req: &HttpRequest) -> Result<Option<String>, AppError> {
    match req.headers().get("Authorization") {
        Some(header_value) => {
            let header_str = header_value.to_str().unwrap_or("").trim();
            let token = header_str.strip_prefix("Bearer ").unwrap_or(header_str).trim();

            if token.is_empty() {
                return Err(AppError::Unauthorized("Invalid token format".to_string()));
            }

            Ok(Some(token.to_string()))
        }
        None => Ok(None),
    }
}

fn access_token(req: &HttpRequest) -> Result<Option<String>, AppError> {
    if let Some(cookie) = req.cookie(ACCESS_COOKIE) {
        if !cookie.value().is_empty() {
            return Ok(Some(cookie.value().to_string()));
        }
    }

    bearer_token(req)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(signup)
        .service(login)
        .service(get_logged_in_user)
        .service(logout);
}
