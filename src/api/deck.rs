//! Swipe deck routes

use actix_web::{get, post, web, HttpRequest, HttpResponse};
use serde::Deserialize;

use super::auth::require_user;
use super::AppState;
use crate::errors::AppError;
use crate::models::SwipeDirection;

#[derive(Debug, Deserialize)]
pub struct SwipeBody {
    pub direction: SwipeDirection,
}

/// Current deck; the first call loads the initial batch
#[get("")]
pub async fn get_deck(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&state, &req).await?;
    let snapshot = state.sessions.snapshot(user.id).await;
    Ok(HttpResponse::Ok().json(snapshot))
}

#[post("/swipe")]
pub async fn swipe(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<SwipeBody>,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&state, &req).await?;
    let snapshot = state.sessions.swipe(user.id, body.direction)?;
    Ok(HttpResponse::Ok().json(snapshot))
}

#[post("/superdislike")]
pub async fn super_dislike(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&state, &req).await?;
    let snapshot = state.sessions.super_dislike(user.id)?;
    Ok(HttpResponse::Ok().json(snapshot))
}

#[post("/reset")]
pub async fn reset(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, AppError> {
    let user = require_user(&state, &req).await?;
    let snapshot = state.sessions.reset(user.id).await;
    Ok(HttpResponse::Ok().json(snapshot))
}

#[post("/play")]
pub async fn toggle_play(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&state, &req).await?;
    let snapshot = state.sessions.toggle_play(user.id)?;
    Ok(HttpResponse::Ok().json(snapshot))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_deck)
        .service(swipe)
        .service(super_dislike)
        .service(reset)
        .service(toggle_play);
}

#[cfg(test)]
mod tests {
    use crate::models::Track;
    use crate::testing::{app_state, bearer_for, FakeCatalog, TestDeps};
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn track(id: &str, artist: &str) -> Track {
        Track::new(id, format!("Song {}", id), artist).with_preview(format!("https://p/{}", id))
    }

    #[actix_web::test]
    async fn test_deck_requires_login() {
        let state = app_state(TestDeps::default()).await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::api::configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/deck").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_swipe_and_super_dislike() {
        let catalog = FakeCatalog::new().with_any_query(vec![
            track("a", "X"),
            track("b", "X"),
            track("c", "Y"),
        ]);
        let state = app_state(TestDeps {
            catalog: Arc::new(catalog),
            ..TestDeps::default()
        })
        .await;
        let (_, bearer) = bearer_for(&state, "mira").await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::api::configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/deck")
            .insert_header(("Authorization", bearer.clone()))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "ready");
        assert_eq!(body["currentIndex"], 2);
        assert_eq!(body["active"]["id"], "c");

        let req = test::TestRequest::post()
            .uri("/deck/swipe")
            .insert_header(("Authorization", bearer.clone()))
            .set_json(json!({"direction": "right"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["likedCount"], 1);
        assert_eq!(body["currentIndex"], 1);

        let req = test::TestRequest::post()
            .uri("/deck/superdislike")
            .insert_header(("Authorization", bearer.clone()))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["dislikedArtists"], json!(["X"]));
        assert_eq!(body["tracks"].as_array().unwrap().len(), 1);
        assert_eq!(body["currentIndex"], -1);
        assert_eq!(body["status"], "exhausted");

        let req = test::TestRequest::post()
            .uri("/deck/swipe")
            .insert_header(("Authorization", bearer.clone()))
            .set_json(json!({"direction": "left"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::post()
            .uri("/deck/play")
            .insert_header(("Authorization", bearer))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn test_reset_falls_back_to_seed_deck() {
        let state = app_state(TestDeps::default()).await;
        let (_, bearer) = bearer_for(&state, "kai").await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::api::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/deck/reset")
            .insert_header(("Authorization", bearer.clone()))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["tracks"].as_array().unwrap().len(), 10);
        assert_eq!(body["active"]["origin"], "seed");

        let req = test::TestRequest::post()
            .uri("/deck/play")
            .insert_header(("Authorization", bearer))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["isPlaying"], true);
    }

    #[actix_web::test]
    async fn test_unknown_direction_is_rejected() {
        let state = app_state(TestDeps::default()).await;
        let (_, bearer) = bearer_for(&state, "kai").await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::api::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/deck/swipe")
            .insert_header(("Authorization", bearer))
            .set_json(json!({"direction": "up"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
