use axum::{extract::State, Extension, Json};
use pulse_pipeline::PublishOutcome;
use serde::Deserialize;
use uuid::Uuid;

use crate::middleware::{Identity, RequestId};

use super::extract::ApiJson;
use super::{map_pipeline_error, require_user, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct PublishRequest {
    pub draft_id: Uuid,
}

pub(super) async fn publish_draft(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(identity): Extension<Identity>,
    ApiJson(body): ApiJson<PublishRequest>,
) -> Result<Json<ApiResponse<PublishOutcome>>, ApiError> {
    let user = require_user(identity, &req_id.0)?;
    let outcome = state
        .pipeline
        .publish(user, body.draft_id)
        .await
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::new(outcome, req_id.0))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{json_body, send, TestApp};
    use axum::http::{Method, StatusCode};
    use chrono::Utc;
    use pulse_core::{PostDraft, PostStatus, Profile};
    use serde_json::json;
    use uuid::Uuid;

    fn seed_draft(app: &TestApp, status: PostStatus) -> Uuid {
        let id = Uuid::new_v4();
        app.store.seed_draft(PostDraft {
            id,
            user_id: app.user,
            topic_id: None,
            insight_ids: vec![],
            generated_text: "Hello".into(),
            edited_text: None,
            status,
            linkedin_post_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        id
    }

    fn link(app: &TestApp) {
        app.store.seed_profile(Profile {
            linkedin_access_token: Some("tok".into()),
            ..Profile::empty(app.user)
        });
    }

    #[tokio::test]
    async fn publish_returns_external_id() {
        let app = TestApp::new();
        link(&app);
        let draft_id = seed_draft(&app, PostStatus::Ready);

        let response = send(
            &app,
            Method::POST,
            "/api/v1/publish",
            Some(&app.user_header()),
            Some(json!({ "draft_id": draft_id })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["data"]["linkedin_post_id"], "urn:li:share:42");
        assert_eq!(json["data"]["reconciled"], true);
        assert_eq!(app.publisher_calls(), 1);
    }

    #[tokio::test]
    async fn publish_without_token_is_forbidden() {
        let app = TestApp::new();
        let draft_id = seed_draft(&app, PostStatus::Draft);

        let response = send(
            &app,
            Method::POST,
            "/api/v1/publish",
            Some(&app.user_header()),
            Some(json!({ "draft_id": draft_id })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(json_body(response).await["error"]["code"], "forbidden");
        assert_eq!(app.publisher_calls(), 0);
    }

    #[tokio::test]
    async fn republishing_conflicts() {
        let app = TestApp::new();
        link(&app);
        let draft_id = seed_draft(&app, PostStatus::Published);

        let response = send(
            &app,
            Method::POST,
            "/api/v1/publish",
            Some(&app.user_header()),
            Some(json!({ "draft_id": draft_id })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(app.publisher_calls(), 0);
    }

    #[tokio::test]
    async fn store_failure_is_reported_without_details() {
        let app = TestApp::new();
        link(&app);
        let draft_id = seed_draft(&app, PostStatus::Draft);
        app.store.fail("get_draft");

        let response = send(
            &app,
            Method::POST,
            "/api/v1/publish",
            Some(&app.user_header()),
            Some(json!({ "draft_id": draft_id })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "internal_error");
        assert!(!json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("get_draft"));
    }
}
