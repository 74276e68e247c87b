/// Task endpoints
///
/// # Endpoints
///
/// - `POST   /api/task/create` - Create a task owned by the actor
/// - `GET    /api/task/getAll` - List live tasks with resolved user refs
/// - `GET    /api/task/:id` - Fetch one live task
/// - `PUT    /api/task/:id/update` - Update fields (behind delete-state guard)
/// - `DELETE /api/task/:id/delete?hard_delete=true` - Soft or hard delete
///
/// # Response shape
///
/// Task bodies expose `is_deleted` but never `deleted_at` or `deleted_by`.
/// The list endpoint's `total_count` counts every task row including
/// soft-deleted ones, even though the item list is filtered to live tasks.
/// Clients reconcile against that number, so it stays.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use crewbase_shared::{
    lifecycle::{delete_mode_from_query, plan_delete, validate_create, validate_update, DeleteAction},
    models::{
        task::{CreateTask, Task, TaskPriority, TaskStatus},
        user::{PublicUser, User},
    },
    policy::Actor,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Task creation request
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: String,

    /// Status as its wire string; validated against the enum
    pub status: String,

    /// Priority as its wire string; validated against the enum
    pub priority: String,

    pub due_date: DateTime<Utc>,
}

/// Task update request
///
/// Strict: any field outside this set fails decoding, which the handler
/// turns into a 400.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateTaskRequest {
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Task as serialized in responses
///
/// Carries the flattened `is_deleted` flag; the deletion timestamp and
/// deleting user never leave the server.
#[derive(Debug, Serialize)]
pub struct TaskBody {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: DateTime<Utc>,
    pub is_deleted: bool,
    pub user_id: Uuid,
    pub created_by: Uuid,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Task> for TaskBody {
    fn from(task: &Task) -> Self {
        TaskBody {
            id: task.id,
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            priority: task.priority,
            due_date: task.due_date,
            is_deleted: task.delete_state.is_deleted(),
            user_id: task.user_id,
            created_by: task.created_by,
            updated_by: task.updated_by,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

/// List item with owner and creator resolved to public user records
#[derive(Debug, Serialize)]
pub struct TaskWithRefs {
    #[serde(flatten)]
    pub task: TaskBody,

    /// Owning user, absent if the account has been deleted since
    pub user: Option<PublicUser>,

    /// Creating user, absent if the account has been deleted since
    pub created_by_user: Option<PublicUser>,
}

/// Response carrying a message and one task
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub message: String,
    pub data: TaskBody,
}

/// Response for the list endpoint
#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub message: String,
    pub data: Vec<TaskWithRefs>,

    /// Count of ALL task rows, soft-deleted included; see module docs
    pub total_count: i64,
}

/// Creates a task
///
/// Owner and creator are both the authenticated actor.
///
/// # Errors
///
/// - `400 Bad Request`: Field validation failed (all failures reported)
pub async fn create_task(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let (status, priority) =
        validate_create(&req.title, &req.description, &req.status, &req.priority)?;

    let task = Task::create(
        &state.db,
        CreateTask {
            title: req.title,
            description: req.description,
            status,
            priority,
            due_date: req.due_date,
            user_id: actor.id,
            created_by: actor.id,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(TaskResponse {
            message: "Task created successfully".to_string(),
            data: TaskBody::from(&task),
        }),
    ))
}

/// Lists live tasks, newest first
///
/// Owner and creator ids are resolved to public user records in one bulk
/// query rather than per task.
pub async fn get_all_tasks(State(state): State<AppState>) -> ApiResult<Json<TaskListResponse>> {
    let tasks = Task::list_live(&state.db).await?;
    let total_count = Task::count_all(&state.db).await?;

    let mut ids: Vec<Uuid> = tasks
        .iter()
        .flat_map(|t| [t.user_id, t.created_by])
        .collect();
    ids.sort_unstable();
    ids.dedup();

    let users: HashMap<Uuid, PublicUser> = User::find_by_ids(&state.db, &ids)
        .await?
        .iter()
        .map(|u| (u.id, u.public()))
        .collect();

    let data = tasks
        .iter()
        .map(|task| TaskWithRefs {
            task: TaskBody::from(task),
            user: users.get(&task.user_id).cloned(),
            created_by_user: users.get(&task.created_by).cloned(),
        })
        .collect();

    Ok(Json(TaskListResponse {
        message: "Tasks fetched successfully".to_string(),
        data,
        total_count,
    }))
}

/// Fetches one live task
///
/// Soft-deleted tasks are indistinguishable from absent ones here.
pub async fn get_task_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskResponse>> {
    let task = Task::find_live_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(TaskResponse {
        message: "Task fetched successfully".to_string(),
        data: TaskBody::from(&task),
    }))
}

/// Updates a task
///
/// Allowed fields are exactly description, status, priority, due_date; the
/// route guard already rejected soft-deleted tasks. Records the actor as
/// `updated_by`.
///
/// # Errors
///
/// - `400 Bad Request`: Unknown field, invalid value, or future due date
/// - `404 Not Found`: No such task
pub async fn update_task(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> ApiResult<Json<TaskResponse>> {
    // Unknown fields and malformed bodies are a 400, not axum's default 422
    let Json(req) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    let fields = validate_update(
        req.description.as_deref(),
        req.status.as_deref(),
        req.priority.as_deref(),
        req.due_date,
        Utc::now(),
    )?;

    let task = Task::update(&state.db, id, fields, actor.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(TaskResponse {
        message: "Task updated successfully".to_string(),
        data: TaskBody::from(&task),
    }))
}

/// Deletes a task, soft by default, hard with `?hard_delete=true`
///
/// The raw query map is inspected so a stray `soft_delete` key can be
/// rejected whatever its value; `hard_delete` must be exactly the string
/// "true" to select the hard path.
///
/// # Errors
///
/// - `400 Bad Request`: Bad query parameter, or the task is already
///   soft-deleted on the soft path
/// - `404 Not Found`: No such task row at all
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<serde_json::Value>> {
    let mode = delete_mode_from_query(
        params.get("hard_delete").map(String::as_str),
        params.contains_key("soft_delete"),
    )?;

    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    match plan_delete(task.delete_state, mode, Utc::now())? {
        DeleteAction::HardDelete => {
            Task::hard_delete(&state.db, id).await?;

            Ok(Json(serde_json::json!({
                "message": "Task permanently deleted"
            })))
        }
        DeleteAction::SoftDelete { deleted_at } => {
            Task::soft_delete(&state.db, id, deleted_at, actor.id).await?;

            Ok(Json(serde_json::json!({
                "message": "Task deleted successfully"
            })))
        }
    }
}
