//! AI discovery routes

use actix_web::{post, web, HttpRequest, HttpResponse};
use serde::Deserialize;

use super::auth::require_user;
use super::AppState;
use crate::errors::AppError;

#[derive(Debug, Deserialize)]
pub struct DiscoverBody {
    #[serde(default)]
    pub prompt: String,
}

/// Free-text discovery, appends the playable results to the deck
#[post("")]
pub async fn discover(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<DiscoverBody>,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&state, &req).await?;
    let added = state.sessions.discover(user.id, &body.prompt).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "added": added,
        "deck": state.sessions.peek(user.id),
    })))
}

/// Discovery seeded with the liked list
#[post("/vibe")]
pub async fn discover_vibe(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&state, &req).await?;
    let added = state.sessions.discover_vibe(user.id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "added": added,
        "deck": state.sessions.peek(user.id),
    })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(discover).service(discover_vibe);
}

#[cfg(test)]
mod tests {
    use crate::models::Track;
    use crate::testing::{app_state, bearer_for, FakeCatalog, FakeModel, TestDeps};
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};
    use std::sync::Arc;

    #[actix_web::test]
    async fn test_discover_appends_to_deck() {
        let found = Track::new("r1", "Nightcall", "Kavinsky").with_preview("https://p/r1");
        let state = app_state(TestDeps {
            catalog: Arc::new(FakeCatalog::new().with_lookup("Nightcall", "Kavinsky", found)),
            model: Arc::new(FakeModel::json(
                r#"[{"title": "Nightcall", "artist": "Kavinsky"}, {"title": "Gone", "artist": "Nobody"}]"#,
            )),
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
            .uri("/discover")
            .insert_header(("Authorization", bearer.clone()))
            .set_json(json!({"prompt": "retro driving music"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["added"], 1);
        assert_eq!(body["deck"]["active"]["id"], "r1");
        assert_eq!(body["deck"]["view"], "swipe");

        let req = test::TestRequest::post()
            .uri("/discover")
            .insert_header(("Authorization", bearer))
            .set_json(json!({"prompt": "   "}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_vibe_discovery_needs_likes() {
        let model = Arc::new(FakeModel::json("[]"));
        let state = app_state(TestDeps {
            model: model.clone(),
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
            .uri("/discover/vibe")
            .insert_header(("Authorization", bearer))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(model.calls(), 0);
    }
}
