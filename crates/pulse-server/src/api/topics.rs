use axum::{extract::State, Extension, Json};
use pulse_core::{Topic, TopicInput};
use serde::Deserialize;

use crate::middleware::{Identity, RequestId};

use super::extract::ApiJson;
use super::{map_pipeline_error, require_user, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct SaveTopicsRequest {
    pub topics: Vec<TopicInput>,
}

pub(super) async fn list_topics(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<ApiResponse<Vec<Topic>>>, ApiError> {
    let Some(user) = identity.0 else {
        return Ok(ApiResponse::new(Vec::new(), req_id.0));
    };
    let topics = state
        .pipeline
        .list_topics(user)
        .await
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::new(topics, req_id.0))
}

pub(super) async fn save_topics(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(identity): Extension<Identity>,
    ApiJson(body): ApiJson<SaveTopicsRequest>,
) -> Result<Json<ApiResponse<Vec<Topic>>>, ApiError> {
    let user = require_user(identity, &req_id.0)?;
    let topics = state
        .pipeline
        .save_topics(user, body.topics)
        .await
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::new(topics, req_id.0))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{json_body, send, TestApp};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn anonymous_list_is_empty() {
        let app = TestApp::new();
        let response = send(&app, Method::GET, "/api/v1/topics", None, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["data"], json!([]));
    }

    #[tokio::test]
    async fn save_returns_refreshed_list_ordered_by_day() {
        let app = TestApp::new();
        let response = send(
            &app,
            Method::PUT,
            "/api/v1/topics",
            Some(&app.user_header()),
            Some(json!({ "topics": [
                { "title": "Venerdì", "day_of_week": 5, "is_active": true },
                { "title": "Lunedì", "day_of_week": 1, "is_active": true }
            ] })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["data"][0]["title"], "Lunedì");
        assert_eq!(json["data"][1]["day_of_week"], 5);
    }

    #[tokio::test]
    async fn out_of_range_day_is_rejected() {
        let app = TestApp::new();
        let response = send(
            &app,
            Method::PUT,
            "/api/v1/topics",
            Some(&app.user_header()),
            Some(json!({ "topics": [{ "title": "X", "day_of_week": 7, "is_active": true }] })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(app.store.topics().is_empty());
    }

    #[tokio::test]
    async fn save_requires_identity() {
        let app = TestApp::new();
        let response = send(
            &app,
            Method::PUT,
            "/api/v1/topics",
            None,
            Some(json!({ "topics": [] })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
