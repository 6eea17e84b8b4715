use axum::{extract::State, Extension, Json};
use pulse_core::{Profile, ProfileUpdate};
use serde::Serialize;

use crate::middleware::{Identity, RequestId};

use super::extract::ApiJson;
use super::{map_pipeline_error, require_user, ApiError, ApiResponse, AppState};

/// Profile as returned to clients: the access token is replaced by whether
/// one is stored.
#[derive(Debug, Serialize)]
pub(super) struct ProfileView {
    #[serde(flatten)]
    pub profile: Profile,
    pub linkedin_connected: bool,
}

impl From<Profile> for ProfileView {
    fn from(profile: Profile) -> Self {
        let linkedin_connected = profile.access_token().is_some();
        Self {
            profile,
            linkedin_connected,
        }
    }
}

pub(super) async fn get_profile(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<ApiResponse<Option<ProfileView>>>, ApiError> {
    let Some(user) = identity.0 else {
        return Ok(ApiResponse::new(None, req_id.0));
    };
    let profile = state
        .pipeline
        .get_profile(user)
        .await
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::new(profile.map(ProfileView::from), req_id.0))
}

pub(super) async fn save_profile(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(identity): Extension<Identity>,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> Result<Json<ApiResponse<ProfileView>>, ApiError> {
    let user = require_user(identity, &req_id.0)?;
    let profile = state
        .pipeline
        .save_profile(user, &update)
        .await
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::new(ProfileView::from(profile), req_id.0))
}
