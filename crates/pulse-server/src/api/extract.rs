//! Body and path extractors whose rejections use the API error envelope.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts, Path, Query, Request,
    },
    http::{request::Parts, Extensions},
    Json,
};

use crate::middleware::RequestId;

use super::ApiError;

const INVALID_REQUEST: &str = "Richiesta non valida";

/// `Json<T>` that answers a malformed or incomplete body with a 400
/// `bad_request` instead of axum's plain-text rejection.
#[derive(Debug)]
pub(super) struct ApiJson<T>(pub T);

/// `Path<T>` with the same rejection behaviour as [`ApiJson`].
#[derive(Debug)]
pub(super) struct ApiPath<T>(pub T);

#[derive(Debug)]
pub(super) struct ApiQuery<T>(pub T);

fn request_id(extensions: &Extensions) -> String {
    extensions
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_default()
}

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let request_id = request_id(req.extensions());
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(
                    request_id = %request_id,
                    error = %rejection.body_text(),
                    "rejecting request body"
                );
                Err(ApiError::new(request_id, "bad_request", INVALID_REQUEST))
            }
        }
    }
}

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    Path<T>: FromRequestParts<S, Rejection = PathRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(Self(value)),
            Err(rejection) => {
                let request_id = request_id(&parts.extensions);
                tracing::debug!(
                    request_id = %request_id,
                    error = %rejection.body_text(),
                    "rejecting path parameters"
                );
                Err(ApiError::new(request_id, "bad_request", INVALID_REQUEST))
            }
        }
    }
}

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => {
                let request_id = request_id(&parts.extensions);
                tracing::debug!(
                    request_id = %request_id,
                    error = %rejection.body_text(),
                    "rejecting query string"
                );
                Err(ApiError::new(request_id, "bad_request", INVALID_REQUEST))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{json_body, send, TestApp};
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use serde_json::json;
    use tower::ServiceExt;

    #[tokio::test]
    async fn missing_body_field_is_a_bad_request_envelope() {
        let app = TestApp::new();
        let response = send(
            &app,
            Method::POST,
            "/api/v1/publish",
            Some(&app.user_header()),
            Some(json!({})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "bad_request");
        assert_eq!(json["error"]["message"], "Richiesta non valida");
        assert!(json["meta"]["request_id"].is_string());
        assert_eq!(app.publisher_calls(), 0);
    }

    #[tokio::test]
    async fn unparseable_body_is_a_bad_request_envelope() {
        let app = TestApp::new();
        let response = app
            .router()
            .oneshot(
                Request::builder()
                    .method(Method::PUT)
                    .uri("/api/v1/topics")
                    .header("content-type", "application/json")
                    .header("x-user-id", app.user_header())
                    .header("x-request-id", "req-7")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "bad_request");
        assert_eq!(json["meta"]["request_id"], "req-7");
    }

    #[tokio::test]
    async fn malformed_draft_id_is_a_bad_request_envelope() {
        let app = TestApp::new();
        let response = send(
            &app,
            Method::GET,
            "/api/v1/drafts/not-a-uuid",
            Some(&app.user_header()),
            None,
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "bad_request");
        assert_eq!(json["error"]["message"], "Richiesta non valida");
    }

    #[tokio::test]
    async fn non_numeric_day_is_a_bad_request_envelope() {
        let app = TestApp::new();
        let response = send(
            &app,
            Method::GET,
            "/api/v1/insights?day_of_week=monday",
            Some(&app.user_header()),
            None,
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "bad_request");
    }
}
