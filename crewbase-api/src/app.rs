/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use crewbase_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = crewbase_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use crewbase_shared::auth::middleware::create_session_middleware;
use crewbase_shared::policy::Operation;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::Config;
use crate::middleware::guard::{permission_guard, task_not_deleted};
use crate::routes;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets the session token signing secret
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Gets the session token lifetime in seconds
    pub fn jwt_expires_in(&self) -> i64 {
        self.config.jwt.expires_in_seconds
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                              # Health check (public)
/// └── /api/
///     ├── /auth/
///     │   ├── POST  /sign-up               # Public; role forced to user
///     │   ├── POST  /sign-in               # Public
///     │   ├── POST  /register              # Admin/manager; explicit role
///     │   └── PATCH /change-password       # Any authenticated user
///     ├── /users/
///     │   └── GET /me                      # Own public record
///     ├── /admin/users                     # Admin/manager only
///     │   ├── GET    /
///     │   ├── PUT    /:id/update
///     │   ├── POST   /:id/deactivate
///     │   ├── POST   /:id/activate
///     │   └── DELETE /:id/delete           # Gated in-handler (check order)
///     └── /task/
///         ├── POST   /create
///         ├── GET    /getAll
///         ├── GET    /:id
///         ├── PUT    /:id/update           # Behind delete-state guard
///         └── DELETE /:id/delete
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Session authentication (per-route-group)
/// 4. Permission / delete-state guards (per route)
pub fn build_router(state: AppState) -> Router {
    let session = middleware::from_fn(create_session_middleware(state.jwt_secret().to_owned()));

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Public auth routes
    let auth_public = Router::new()
        .route("/sign-up", post(routes::auth::sign_up))
        .route("/sign-in", post(routes::auth::sign_in));

    // Authenticated auth routes
    let auth_protected = Router::new()
        .route(
            "/register",
            post(routes::auth::register)
                .route_layer(middleware::from_fn(permission_guard(Operation::RegisterUser))),
        )
        .route("/change-password", patch(routes::auth::change_password))
        .layer(session.clone());

    // Current-user routes
    let user_routes = Router::new()
        .route("/me", get(routes::users::me))
        .layer(session.clone());

    // Admin user management. Each route names the operation it performs;
    // delete is not route-gated because its role check runs third in the
    // handler's check order, after NotFound and the self-delete rule.
    let admin_routes = Router::new()
        .route(
            "/users",
            get(routes::admin::list_users)
                .route_layer(middleware::from_fn(permission_guard(Operation::ListUsers))),
        )
        .route(
            "/users/:id/update",
            put(routes::admin::update_user)
                .route_layer(middleware::from_fn(permission_guard(Operation::UpdateUser))),
        )
        .route(
            "/users/:id/deactivate",
            post(routes::admin::deactivate_user).route_layer(middleware::from_fn(
                permission_guard(Operation::DeactivateUser),
            )),
        )
        .route(
            "/users/:id/activate",
            post(routes::admin::activate_user)
                .route_layer(middleware::from_fn(permission_guard(Operation::ActivateUser))),
        )
        .route("/users/:id/delete", delete(routes::admin::delete_user))
        .layer(session.clone());

    // Task routes; update sits behind the delete-state guard
    let task_routes = Router::new()
        .route("/create", post(routes::tasks::create_task))
        .route("/getAll", get(routes::tasks::get_all_tasks))
        .route("/:id", get(routes::tasks::get_task_by_id))
        .route(
            "/:id/update",
            put(routes::tasks::update_task).route_layer(middleware::from_fn_with_state(
                state.clone(),
                task_not_deleted,
            )),
        )
        .route("/:id/delete", delete(routes::tasks::delete_task))
        .layer(session);

    let api_routes = Router::new()
        .nest("/auth", auth_public.merge(auth_protected))
        .nest("/users", user_routes)
        .nest("/admin", admin_routes)
        .nest("/task", task_routes);

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
