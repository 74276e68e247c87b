/// Current-user endpoints
///
/// # Endpoints
///
/// - `GET /api/users/me` - The authenticated user's own public record

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use crewbase_shared::{
    models::user::{PublicUser, User},
    policy::Actor,
};
use serde::Serialize;

/// Own-record response
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: PublicUser,
}

/// Returns the authenticated user's own record
///
/// The token can outlive the account: a valid session whose user row has
/// been deleted gets a 404 here, not a 401.
pub async fn me(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<MeResponse>> {
    let user = User::find_by_id(&state.db, actor.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(MeResponse { user: user.public() }))
}
