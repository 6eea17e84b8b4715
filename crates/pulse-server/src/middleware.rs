use axum::{
    extract::{Query, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use pulse_core::UserId;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// The caller resolved for this request, stored as a request extension.
/// `None` when no identity was supplied and no demo user is configured.
#[derive(Debug, Clone, Copy)]
pub struct Identity(pub Option<UserId>);

#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityConfig {
    /// Fallback identity for single-user demo deployments.
    pub demo_user: Option<UserId>,
}

#[derive(Debug, Deserialize)]
struct UserQuery {
    user_id: Option<String>,
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware resolving the caller: `x-user-id` header, then the `user_id`
/// query parameter, then the configured demo user.
///
/// A supplied value that is not a UUID is rejected with 400.
pub async fn resolve_identity(
    State(config): State<IdentityConfig>,
    mut req: Request,
    next: Next,
) -> Response {
    let supplied = header_user(&req).or_else(|| query_user(&req));

    let user = match supplied {
        Some(raw) => match raw.parse::<UserId>() {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::debug!(error = %e, "rejecting malformed user id");
                let request_id = req
                    .extensions()
                    .get::<RequestId>()
                    .map(|r| r.0.clone())
                    .unwrap_or_default();
                return ApiError::new(
                    request_id,
                    "validation_error",
                    "Identificativo utente non valido",
                )
                .into_response();
            }
        },
        None => config.demo_user,
    };

    req.extensions_mut().insert(Identity(user));
    next.run(req).await
}

fn header_user(req: &Request) -> Option<String> {
    req.headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

fn query_user(req: &Request) -> Option<String> {
    Query::<UserQuery>::try_from_uri(req.uri())
        .ok()
        .and_then(|Query(q)| q.user_id)
        .filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request(uri: &str, header: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri(uri);
        if let Some(value) = header {
            builder = builder.header(USER_ID_HEADER, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn header_wins_over_query() {
        let req = request("/api/v1/topics?user_id=from-query", Some("from-header"));
        assert_eq!(header_user(&req).as_deref(), Some("from-header"));
        assert_eq!(query_user(&req).as_deref(), Some("from-query"));
    }

    #[test]
    fn blank_values_are_ignored() {
        let req = request("/api/v1/topics?user_id=", Some("  "));
        assert_eq!(header_user(&req), None);
        assert_eq!(query_user(&req), None);
    }
}
