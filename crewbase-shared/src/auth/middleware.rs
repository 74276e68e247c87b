/// Authentication middleware for Axum
///
/// Validates the `Authorization: Bearer <token>` header, decodes the session
/// token, and inserts an [`Actor`] into the request extensions. Handlers and
/// downstream guards extract the actor with `Extension<Actor>` and pass it
/// explicitly into the policy layer; nothing downstream re-reads the token.
///
/// # Example
///
/// ```no_run
/// use axum::{Router, routing::get, middleware, Extension};
/// use crewbase_shared::auth::middleware::create_session_middleware;
/// use crewbase_shared::policy::Actor;
///
/// async fn protected_handler(Extension(actor): Extension<Actor>) -> String {
///     format!("Hello, {}!", actor.email)
/// }
///
/// let app: Router = Router::new()
///     .route("/protected", get(protected_handler))
///     .layer(middleware::from_fn(create_session_middleware("secret")));
/// ```

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::jwt::{validate_token, JwtError};
use crate::policy::Actor;

/// Error type for authentication middleware
#[derive(Debug)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Invalid authorization header format
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(String),
}

impl AuthError {
    fn message(&self) -> String {
        match self {
            AuthError::MissingCredentials => "Missing credentials".to_string(),
            AuthError::InvalidFormat(msg) => msg.clone(),
            AuthError::InvalidToken(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // Every authentication failure is 401 with a JSON body
        let body = Json(json!({ "message": self.message() }));
        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

/// Session authentication middleware
///
/// Validates tokens from the `Authorization: Bearer <token>` header.
///
/// # Returns
///
/// Response with an [`Actor`] extension added on success
///
/// # Errors
///
/// Returns 401 Unauthorized if:
/// - Authorization header is missing
/// - Token format is invalid
/// - Token validation fails
/// - Token has expired
pub async fn session_auth_middleware(
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    // Extract Authorization header
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    // Parse Bearer token
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    // Validate token
    let claims = validate_token(token, &secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken(format!("Invalid token: {}", e)),
    })?;

    // Add the actor to request extensions
    req.extensions_mut().insert(claims.actor());

    Ok(next.run(req).await)
}

/// Creates a session authentication middleware closure
///
/// Helper function that captures the signing secret and returns a middleware
/// function suitable for `middleware::from_fn`.
///
/// # Example
///
/// ```no_run
/// use axum::{Router, routing::get, middleware};
/// use crewbase_shared::auth::middleware::create_session_middleware;
///
/// let app: Router = Router::new()
///     .route("/protected", get(|| async { "OK" }))
///     .layer(middleware::from_fn(create_session_middleware("secret")));
/// ```
pub fn create_session_middleware(
    secret: impl Into<String>,
) -> impl Fn(Request, Next) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AuthError>> + Send>> + Clone {
    let secret = secret.into();
    move |req, next| {
        let secret = secret.clone();
        Box::pin(session_auth_middleware(secret, req, next))
    }
}

/// Reads an already-authenticated actor from a request's extensions
///
/// Guards that run after the session middleware use this instead of
/// re-validating the token.
pub fn actor_from_request(req: &Request) -> Result<Actor, AuthError> {
    req.extensions()
        .get::<Actor>()
        .cloned()
        .ok_or(AuthError::MissingCredentials)
}
