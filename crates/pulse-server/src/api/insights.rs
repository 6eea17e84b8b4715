use axum::{extract::State, Extension, Json};
use pulse_core::Insight;
use pulse_pipeline::today_day_of_week;
use serde::Deserialize;

use crate::middleware::{Identity, RequestId};

use super::extract::ApiQuery;
use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct InsightsQuery {
    /// Overrides today's weekday (0 = Sunday).
    pub day_of_week: Option<u8>,
}

/// Runs today's ingestion for the caller. Without an identity the list is
/// empty rather than an error.
pub(super) async fn list_today_insights(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(identity): Extension<Identity>,
    ApiQuery(query): ApiQuery<InsightsQuery>,
) -> Result<Json<ApiResponse<Vec<Insight>>>, ApiError> {
    let Some(user) = identity.0 else {
        return Ok(ApiResponse::new(Vec::new(), req_id.0));
    };

    let day = query.day_of_week.unwrap_or_else(today_day_of_week);
    if day > 6 {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "day_of_week deve essere tra 0 e 6",
        ));
    }

    let insights = state.pipeline.ingest_today(user, day).await;
    Ok(ApiResponse::new(insights, req_id.0))
}
