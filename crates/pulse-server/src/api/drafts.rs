use axum::{extract::State, Extension, Json};
use pulse_core::{DraftUpdate, PostDraft};
use pulse_pipeline::{today_day_of_week, DraftView, ImageAttachment};
use serde::Deserialize;
use uuid::Uuid;

use crate::middleware::{Identity, RequestId};

use super::extract::{ApiJson, ApiPath};
use super::{map_pipeline_error, require_user, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct GenerateRequest {
    pub insight_ids: Vec<Uuid>,
    pub day_of_week: Option<u8>,
}

pub(super) async fn generate_draft(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(identity): Extension<Identity>,
    ApiJson(body): ApiJson<GenerateRequest>,
) -> Result<Json<ApiResponse<PostDraft>>, ApiError> {
    let user = require_user(identity, &req_id.0)?;
    let day = body.day_of_week.unwrap_or_else(today_day_of_week);

    let draft = state
        .pipeline
        .create_draft(user, &body.insight_ids, day)
        .await
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;

    Ok(ApiResponse::new(draft, req_id.0))
}

pub(super) async fn get_draft(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(identity): Extension<Identity>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<DraftView>>, ApiError> {
    let user = require_user(identity, &req_id.0)?;
    let view = state
        .pipeline
        .get_draft(user, id)
        .await
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::new(view, req_id.0))
}

pub(super) async fn save_draft(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(identity): Extension<Identity>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(update): ApiJson<DraftUpdate>,
) -> Result<Json<ApiResponse<DraftView>>, ApiError> {
    let user = require_user(identity, &req_id.0)?;
    let view = state
        .pipeline
        .save_draft(user, id, &update)
        .await
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::new(view, req_id.0))
}

pub(super) async fn attach_image(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(identity): Extension<Identity>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<ImageAttachment>>, ApiError> {
    let user = require_user(identity, &req_id.0)?;
    let attachment = state
        .pipeline
        .attach_image(user, id)
        .await
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::new(attachment, req_id.0))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{json_body, send, TestApp};
    use axum::http::{Method, StatusCode};
    use pulse_core::NewInsight;
    use serde_json::json;

    fn seed_insight(app: &TestApp) -> uuid::Uuid {
        app.store
            .seed_insight(&NewInsight {
                user_id: app.user,
                topic_id: None,
                title: "Titolo".into(),
                url: "https://hbr.org/x".into(),
                source: "Harvard Business Review".into(),
                published_date: None,
                summary_bullets: vec!["Punto.".into()],
                content: None,
                pulse_score: 75,
            })
            .id
    }

    #[tokio::test]
    async fn generate_requires_identity() {
        let app = TestApp::new();
        let response = send(
            &app,
            Method::POST,
            "/api/v1/generate",
            None,
            Some(json!({ "insight_ids": [] })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "bad_request");
    }

    #[tokio::test]
    async fn generate_then_edit_then_read() {
        let app = TestApp::new();
        app.store.seed_topic(app.user, "AI regulation", 2, true);
        let insight_id = seed_insight(&app);
        let user = app.user_header();

        let response = send(
            &app,
            Method::POST,
            "/api/v1/generate",
            Some(&user),
            Some(json!({ "insight_ids": [insight_id], "day_of_week": 2 })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let draft = json_body(response).await;
        assert_eq!(draft["data"]["status"], "draft");
        let draft_id = draft["data"]["id"].as_str().unwrap().to_string();

        let response = send(
            &app,
            Method::PUT,
            &format!("/api/v1/drafts/{draft_id}"),
            Some(&user),
            Some(json!({ "edited_text": "Testo finale", "status": "ready" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(
            &app,
            Method::GET,
            &format!("/api/v1/drafts/{draft_id}"),
            Some(&user),
            None,
        )
        .await;
        let json = json_body(response).await;
        assert_eq!(json["data"]["edited_text"], "Testo finale");
        assert_eq!(json["data"]["status"], "ready");
        assert_eq!(json["data"]["image_assets"], json!([]));
    }

    #[tokio::test]
    async fn generate_with_too_many_insights_is_a_validation_error() {
        let app = TestApp::new();
        let ids: Vec<uuid::Uuid> = (0..4).map(|_| uuid::Uuid::new_v4()).collect();
        let response = send(
            &app,
            Method::POST,
            "/api/v1/generate",
            Some(&app.user_header()),
            Some(json!({ "insight_ids": ids, "day_of_week": 2 })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn setting_published_through_the_editor_is_rejected() {
        let app = TestApp::new();
        let response = send(
            &app,
            Method::PUT,
            &format!("/api/v1/drafts/{}", uuid::Uuid::new_v4()),
            Some(&app.user_header()),
            Some(json!({ "status": "published" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_draft_is_not_found() {
        let app = TestApp::new();
        let response = send(
            &app,
            Method::GET,
            &format!("/api/v1/drafts/{}", uuid::Uuid::new_v4()),
            Some(&app.user_header()),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = json_body(response).await;
        assert_eq!(json["error"]["message"], "Bozza non trovata");
    }

    #[tokio::test]
    async fn image_attach_returns_public_url() {
        let app = TestApp::new();
        app.store.seed_topic(app.user, "AI regulation", 2, true);
        let insight_id = seed_insight(&app);
        let user = app.user_header();
        let response = send(
            &app,
            Method::POST,
            "/api/v1/generate",
            Some(&user),
            Some(json!({ "insight_ids": [insight_id], "day_of_week": 2 })),
        )
        .await;
        let draft_id = json_body(response).await["data"]["id"]
            .as_str()
            .unwrap()
            .to_string();

        let response = send(
            &app,
            Method::POST,
            &format!("/api/v1/drafts/{draft_id}/image"),
            Some(&user),
            None,
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        let url = json["data"]["image_url"].as_str().unwrap();
        assert!(url.starts_with(&format!("https://cdn.test/{user}/{draft_id}_")));
        assert_eq!(json["data"]["asset"]["url"], url);
    }
}
