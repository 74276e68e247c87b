/// Route guards
///
/// Two guards run between authentication and the handlers:
///
/// - [`permission_guard`]: checks the actor's role against the permission
///   table for one operation. Applied per route, so each route names the
///   operation it performs.
/// - [`task_not_deleted`]: fetches the addressed task and rejects the
///   request when it is soft-deleted. Applied to the task update path only;
///   the delete path inspects the state itself because hard delete must see
///   soft-deleted rows.
///
/// Both guards read the [`Actor`] the session middleware placed in request
/// extensions; neither re-validates the token.

use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::Response,
};
use crewbase_shared::auth::middleware::actor_from_request;
use crewbase_shared::models::task::Task;
use crewbase_shared::policy::{is_allowed, Operation};
use uuid::Uuid;

use crate::{app::AppState, error::ApiError};

/// Creates a middleware closure gating one operation
///
/// Returns 401 when no actor is present (the session layer did not run or
/// was bypassed) and 403 when the actor's role is not in the operation's
/// permission-table row.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Router};
/// use crewbase_api::middleware::guard::permission_guard;
/// use crewbase_shared::policy::Operation;
///
/// let admin: Router<crewbase_api::app::AppState> = Router::new()
///     .route("/users", get(|| async { "OK" }))
///     .route_layer(middleware::from_fn(permission_guard(Operation::ListUsers)));
/// ```
pub fn permission_guard(
    operation: Operation,
) -> impl Fn(Request, Next) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, ApiError>> + Send>> + Clone {
    move |req, next| Box::pin(check_permission(operation, req, next))
}

async fn check_permission(
    operation: Operation,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let actor = actor_from_request(&req)?;

    if !is_allowed(actor.role, operation) {
        return Err(ApiError::Forbidden("Forbidden".to_string()));
    }

    Ok(next.run(req).await)
}

/// Blocks mutations of soft-deleted tasks
///
/// Looks the task up by the `:id` path parameter. A missing task is 404; a
/// soft-deleted one is 400 before the handler runs, so the update handler
/// never has to reason about delete state.
pub async fn task_not_deleted(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    if task.delete_state.is_deleted() {
        return Err(ApiError::BadRequest(
            "Task is already deleted not allowed to update or delete".to_string(),
        ));
    }

    Ok(next.run(req).await)
}
