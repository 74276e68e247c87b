/// Admin user management endpoints
///
/// All routes here except delete sit behind a permission-table guard for
/// their operation; delete runs its own checks in a fixed order (missing
/// target, then self-delete, then role) so the guard would mask the
/// documented responses.
///
/// # Endpoints
///
/// - `GET    /api/admin/users?q&page&limit` - Paged, filtered user list
/// - `PUT    /api/admin/users/:id/update` - Change name/role/is_active
/// - `POST   /api/admin/users/:id/deactivate` - Block sign-in
/// - `POST   /api/admin/users/:id/activate` - Restore sign-in
/// - `DELETE /api/admin/users/:id/delete` - Permanent removal

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use crewbase_shared::{
    models::user::{PublicUser, Role, UpdateUserFields, User},
    policy::{authorize_user_delete, plan_user_update, Actor, PageParams},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User list query parameters
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    /// Case-insensitive substring filter on name or email
    pub q: Option<String>,

    /// 1-based page number
    pub page: Option<i64>,

    /// Page size, clamped to [1, 50]
    pub limit: Option<i64>,
}

/// User list response
#[derive(Debug, Serialize)]
pub struct ListUsersResponse {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
    pub items: Vec<PublicUser>,
}

/// User update request
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,

    /// Role as its wire string; parsed after the role-change gate
    pub role: Option<String>,

    pub is_active: Option<bool>,
}

/// Response carrying an outcome message and the affected user
#[derive(Debug, Serialize)]
pub struct UserActionResponse {
    pub message: String,
    pub user: PublicUser,
}

/// Lists users, filtered and paged
///
/// Out-of-range paging values are clamped, not rejected; `total_pages` is
/// the ceiling of total over limit.
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> ApiResult<Json<ListUsersResponse>> {
    let params = PageParams::clamp(query.page, query.limit);
    let filter = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());

    let users = User::search(&state.db, filter, params.limit, params.offset()).await?;
    let total = User::count(&state.db, filter).await?;

    Ok(Json(ListUsersResponse {
        page: params.page,
        limit: params.limit,
        total,
        total_pages: params.total_pages(total),
        items: users.iter().map(User::public).collect(),
    }))
}

/// Updates a user record
///
/// Name and activation are open to anyone past the route guard; the role
/// field additionally needs the role-assignment gate, checked by the policy
/// layer before anything is written.
///
/// # Errors
///
/// - `400 Bad Request`: Supplied role is not admin/manager/user
/// - `403 Forbidden`: Actor may not assign roles
/// - `404 Not Found`: No such user
pub async fn update_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserActionResponse>> {
    let role = req
        .role
        .as_deref()
        .map(str::parse::<Role>)
        .transpose()
        .map_err(ApiError::BadRequest)?;

    let fields = UpdateUserFields {
        name: req.name,
        role,
        is_active: req.is_active,
    };

    plan_user_update(&actor, &fields)?;

    let user = User::update(&state.db, id, fields)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserActionResponse {
        message: "updated".to_string(),
        user: user.public(),
    }))
}

/// Sets is_active = false on a user
///
/// No self-protection here: an admin can lock themselves out.
pub async fn deactivate_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserActionResponse>> {
    let user = User::set_active(&state.db, id, false)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserActionResponse {
        message: "deactivated".to_string(),
        user: user.public(),
    }))
}

/// Sets is_active = true on a user
pub async fn activate_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserActionResponse>> {
    let user = User::set_active(&state.db, id, true)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserActionResponse {
        message: "activated".to_string(),
        user: user.public(),
    }))
}

/// Permanently deletes a user
///
/// Authorization runs to completion before the row is touched, in the
/// order: missing target (404), self-delete (403 even for admins), then
/// the actor's role (400 "Invalid role"). A failed check leaves the record
/// exactly as it was.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserActionResponse>> {
    let target = User::find_by_id(&state.db, id).await?;

    authorize_user_delete(&actor, target.as_ref())?;

    // authorize_user_delete returned Ok, so target is Some
    let target = target.ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    User::delete(&state.db, target.id).await?;

    Ok(Json(UserActionResponse {
        message: "deleted".to_string(),
        user: target.public(),
    }))
}
