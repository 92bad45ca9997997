//! Friend suggestion routes

use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};
use serde::Deserialize;

use super::auth::require_user;
use super::AppState;
use crate::errors::AppError;
use crate::models::Track;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default = "first_page")]
    pub page: usize,
}

fn first_page() -> usize {
    1
}

#[derive(Debug, Deserialize)]
pub struct AddSuggestionBody {
    pub track: Track,
}

#[get("")]
pub async fn get_suggestions(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&state, &req).await?;
    Ok(HttpResponse::Ok().json(state.sessions.suggestions(user.id)))
}

#[get("/search")]
pub async fn search(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&state, &req).await?;
    let page = state
        .sessions
        .search_suggestions(user.id, &query.q, query.page)
        .await?;
    Ok(HttpResponse::Ok().json(page))
}

#[post("")]
pub async fn add_suggestion(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<AddSuggestionBody>,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&state, &req).await?;
    let staged = state
        .sessions
        .add_suggestion(user.id, body.into_inner().track)?;
    Ok(HttpResponse::Ok().json(staged))
}

#[delete("/{id}")]
pub async fn remove_suggestion(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&state, &req).await?;
    let staged = state.sessions.remove_suggestion(user.id, &path)?;
    Ok(HttpResponse::Ok().json(staged))
}

/// Import the staged tracks into the deck
#[post("/finish")]
pub async fn finish(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, AppError> {
    let user = require_user(&state, &req).await?;
    Ok(HttpResponse::Ok().json(state.sessions.finish_suggestions(user.id)))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_suggestions)
        .service(search)
        .service(add_suggestion)
        .service(finish)
        .service(remove_suggestion);
}

#[cfg(test)]
mod tests {
    use crate::models::Track;
    use crate::testing::{app_state, bearer_for, FakeCatalog, TestDeps};
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn results(n: usize) -> Vec<Track> {
        (1..=n)
            .map(|i| {
                Track::new(format!("s{}", i), format!("Song {}", i), "Band")
                    .with_preview(format!("https://p/{}", i))
            })
            .collect()
    }

    #[actix_web::test]
    async fn test_search_stage_and_finish() {
        let state = app_state(TestDeps {
            catalog: Arc::new(FakeCatalog::new().with_query("band", results(8))),
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
            .uri("/suggest/search?q=band&page=2")
            .insert_header(("Authorization", bearer.clone()))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["totalPages"], 2);
        assert_eq!(body["items"].as_array().unwrap().len(), 2);
        let pick = body["items"][0].clone();

        let req = test::TestRequest::post()
            .uri("/suggest")
            .insert_header(("Authorization", bearer.clone()))
            .set_json(json!({ "track": pick }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().unwrap().len(), 1);

        // staged tracks drop out of later searches
        let req = test::TestRequest::get()
            .uri("/suggest/search?q=band")
            .insert_header(("Authorization", bearer.clone()))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["totalResults"], 7);

        let req = test::TestRequest::post()
            .uri("/suggest/finish")
            .insert_header(("Authorization", bearer.clone()))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["active"]["id"], "s7");
        assert_eq!(body["view"], "swipe");

        let req = test::TestRequest::get()
            .uri("/suggest")
            .insert_header(("Authorization", bearer))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!([]));
    }

    #[actix_web::test]
    async fn test_blank_search_and_unknown_removal() {
        let state = app_state(TestDeps::default()).await;
        let (_, bearer) = bearer_for(&state, "kai").await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::api::configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/suggest/search?q=")
            .insert_header(("Authorization", bearer.clone()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::delete()
            .uri("/suggest/nope")
            .insert_header(("Authorization", bearer))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
