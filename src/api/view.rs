//! View router

use actix_web::{get, put, web, HttpRequest, HttpResponse};
use serde::Deserialize;

use super::auth::require_user;
use super::AppState;
use crate::errors::AppError;
use crate::models::View;

#[derive(Debug, Deserialize)]
pub struct ViewBody {
    pub view: View,
}

#[get("")]
pub async fn get_view(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, AppError> {
    let user = require_user(&state, &req).await?;
    let view = state.sessions.view(user.id);
    Ok(HttpResponse::Ok().json(serde_json::json!({ "view": view })))
}

#[put("")]
pub async fn set_view(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<ViewBody>,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&state, &req).await?;
    let view = state.sessions.set_view(user.id, body.view);
    Ok(HttpResponse::Ok().json(serde_json::json!({ "view": view })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_view).service(set_view);
}

#[cfg(test)]
mod tests {
    use crate::testing::{app_state, bearer_for, TestDeps};
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};

    #[actix_web::test]
    async fn test_switch_views() {
        let state = app_state(TestDeps::default()).await;
        let (_, bearer) = bearer_for(&state, "mira").await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::api::configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/view")
            .insert_header(("Authorization", bearer.clone()))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["view"], "swipe");

        let req = test::TestRequest::put()
            .uri("/view")
            .insert_header(("Authorization", bearer.clone()))
            .set_json(json!({"view": "suggest"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["view"], "suggest");

        let req = test::TestRequest::put()
            .uri("/view")
            .insert_header(("Authorization", bearer))
            .set_json(json!({"view": "settings"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
