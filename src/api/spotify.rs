//! Spotify connect api routes

use actix_web::http::header;
use actix_web::{delete, get, web, HttpRequest, HttpResponse};
use serde::Deserialize;

use super::auth::require_user;
use super::AppState;
use crate::core::CallbackParams;
use crate::errors::AppError;

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<u32>,
}

/// Start the authorization code flow
async fn start(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, AppError> {
    let user = require_user(&state, &req).await?;
    let authorize_url = state.spotify.start(user.id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "authorizeUrl": authorize_url
    })))
}

async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed()
        .insert_header((header::ALLOW, "POST"))
        .json(serde_json::json!({
            "error": "method_not_allowed",
            "msg": "Method not allowed"
        }))
}

/// Redirect target registered with Spotify; always answers with a redirect
#[get("/callback")]
pub async fn callback(
    state: web::Data<AppState>,
    query: web::Query<CallbackParams>,
) -> Result<HttpResponse, AppError> {
    let outcome = state.spotify.handle_callback(&query).await;
    let location = state.spotify.callback_location(&outcome)?;

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish())
}

#[get("/status")]
pub async fn status(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, AppError> {
    let user = require_user(&state, &req).await?;
    let status = state.spotify.connection_status(user.id).await?;
    Ok(HttpResponse::Ok().json(status))
}

#[get("/profile")]
pub async fn profile(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&state, &req).await?;
    let profile = state.spotify.profile(user.id).await?;
    Ok(HttpResponse::Ok().json(profile))
}

#[get("/top/tracks")]
pub async fn top_tracks(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<LimitQuery>,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&state, &req).await?;
    let tracks = state.spotify.top_tracks(user.id, query.limit).await?;
    Ok(HttpResponse::Ok().json(tracks))
}

#[get("/top/artists")]
pub async fn top_artists(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<LimitQuery>,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&state, &req).await?;
    let artists = state.spotify.top_artists(user.id, query.limit).await?;
    Ok(HttpResponse::Ok().json(artists))
}

#[get("/overview")]
pub async fn overview(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&state, &req).await?;
    let overview = state.spotify.overview(user.id).await?;
    Ok(HttpResponse::Ok().json(overview))
}

/// Forget the stored tokens
#[delete("/connection")]
pub async fn disconnect(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&state, &req).await?;
    let removed = state.spotify.disconnect(user.id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "disconnected": removed })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/start")
            .route(web::post().to(start))
            .default_service(web::to(method_not_allowed)),
    )
    .service(callback)
    .service(status)
    .service(profile)
    .service(top_tracks)
    .service(top_artists)
    .service(overview)
    .service(disconnect);
}

#[cfg(test)]
mod tests {
    use crate::testing::{app_state, bearer_for, grant, TestDeps};
    use actix_web::{http::header, http::StatusCode, test, App};
    use std::sync::Arc;

    fn location(resp: &actix_web::dev::ServiceResponse) -> String {
        resp.headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }

    fn state_param(authorize_url: &str) -> String {
        let url = reqwest::Url::parse(authorize_url).unwrap();
        url.query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned())
            .unwrap()
    }

    #[actix_web::test]
    async fn test_start_rejects_other_methods_before_auth() {
        let state = app_state(TestDeps::default()).await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::api::configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/spotify/start")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

        let req = test::TestRequest::post()
            .uri("/api/spotify/start")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_connect_round_trip() {
        let spotify = Arc::new(crate::testing::FakeSpotify::new());
        spotify.set_exchange(grant("access-1", Some("refresh-1"), 3600));
        let state = app_state(TestDeps {
            spotify: spotify.clone(),
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

        let req = test::TestRequest::post()
            .uri("/api/spotify/start")
            .insert_header(("Authorization", bearer.clone()))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let authorize_url = body["authorizeUrl"].as_str().unwrap();
        assert!(authorize_url.starts_with("https://accounts.spotify.com/authorize?"));
        let st = state_param(authorize_url);
        assert_eq!(st.len(), 32);

        let req = test::TestRequest::get()
            .uri(&format!("/api/spotify/callback?code=abc&state={}", st))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), "http://localhost:3000/?connected=true");

        let req = test::TestRequest::get()
            .uri("/api/spotify/status")
            .insert_header(("Authorization", bearer.clone()))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, serde_json::json!("connected"));

        // the state token was spent
        let req = test::TestRequest::get()
            .uri(&format!("/api/spotify/callback?code=abc&state={}", st))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(
            location(&resp),
            "http://localhost:3000/spotify-error?reason=invalid_state"
        );

        let req = test::TestRequest::delete()
            .uri("/api/spotify/connection")
            .insert_header(("Authorization", bearer.clone()))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["disconnected"], true);

        let req = test::TestRequest::get()
            .uri("/api/spotify/status")
            .insert_header(("Authorization", bearer))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, serde_json::json!("not_connected"));
    }

    #[actix_web::test]
    async fn test_callback_without_state() {
        let state = app_state(TestDeps::default()).await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::api::configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/spotify/callback?code=abc")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            location(&resp),
            "http://localhost:3000/spotify-error?reason=missing_state"
        );
    }

    #[actix_web::test]
    async fn test_panels_need_connection() {
        let state = app_state(TestDeps::default()).await;
        let (_, bearer) = bearer_for(&state, "kai").await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::api::configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/spotify/overview")
            .insert_header(("Authorization", bearer))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn test_start_without_settings_is_server_error() {
        let state = app_state(TestDeps {
            settings: None,
            ..TestDeps::default()
        })
        .await;
        let (_, bearer) = bearer_for(&state, "kai").await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::api::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/spotify/start")
            .insert_header(("Authorization", bearer))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
