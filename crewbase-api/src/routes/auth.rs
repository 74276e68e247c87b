/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/sign-up` - Public self-registration (role forced to user)
/// - `POST /api/auth/sign-in` - Login and get a session token
/// - `POST /api/auth/register` - Admin/manager registration with explicit role
/// - `PATCH /api/auth/change-password` - Change own password
///
/// # Password policy
///
/// Registration accepts 6-character passwords while sign-in requires 8: an
/// account created with a 6- or 7-character password exists but cannot log
/// in. That boundary is part of the API contract and is kept as-is.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use crewbase_shared::{
    auth::{jwt, password},
    models::user::{CreateUser, PublicUser, Role, User},
    policy::{
        registration_role, validate_login_password, Actor, RegistrationChannel,
    },
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Registration request (shared by sign-up and register)
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Plaintext password, hashed before storage
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    /// Requested role; honored only on the admin register path
    pub role: Option<String>,

    /// Initial activation state (defaults to active)
    pub is_active: Option<bool>,
}

/// Registration response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: PublicUser,
}

/// Sign-in request
#[derive(Debug, Deserialize, Validate)]
pub struct SignInRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Sign-in response
#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub message: String,
    pub user: PublicUser,
    pub token: String,
}

/// Change-password request
///
/// Both fields optional at the serde level so the missing-field case can
/// answer with the combined message instead of a decode error.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

/// Parses and gates the requested role for one registration channel
fn resolve_role(requested: Option<&str>, channel: RegistrationChannel) -> Result<Role, ApiError> {
    let requested = requested
        .map(str::parse::<Role>)
        .transpose()
        .map_err(ApiError::BadRequest)?;

    Ok(registration_role(requested, channel))
}

/// Creates the account a registration request describes
///
/// The duplicate-email check runs up front for the friendly 409; the unique
/// index on LOWER(email) backstops the race where two registrations pass the
/// check at once.
async fn create_account(
    state: &AppState,
    req: RegisterRequest,
    channel: RegistrationChannel,
) -> Result<User, ApiError> {
    req.validate()?;

    let role = resolve_role(req.role.as_deref(), channel)?;

    if User::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::Conflict("email already registered".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            name: req.name,
            email: req.email,
            password_hash,
            role,
            is_active: req.is_active.unwrap_or(true),
        },
    )
    .await?;

    Ok(user)
}

/// Public self-registration
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/sign-up
/// Content-Type: application/json
///
/// { "name": "Jane Doe", "email": "jane@example.com", "password": "secret1" }
/// ```
///
/// The role is always `user` here, whatever the request claimed.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `409 Conflict`: Email already registered (case-insensitive)
pub async fn sign_up(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let user = create_account(&state, req, RegistrationChannel::SignUp).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "registered".to_string(),
            user: user.public(),
        }),
    ))
}

/// Admin/manager registration
///
/// Identical to sign-up except the requested role is honored. The route
/// guard has already checked the actor against the RegisterUser gate.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or invalid role
/// - `403 Forbidden`: Actor's role fails the gate (rejected by the guard)
/// - `409 Conflict`: Email already registered
pub async fn register(
    State(state): State<AppState>,
    Extension(_actor): Extension<Actor>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let user = create_account(&state, req, RegistrationChannel::AdminRegister).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "registered".to_string(),
            user: user.public(),
        }),
    ))
}

/// Login
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/sign-in
/// Content-Type: application/json
///
/// { "email": "jane@example.com", "password": "longenough" }
/// ```
///
/// Unknown email, deactivated account and wrong password are all the same
/// 401 so the response does not reveal which part failed. The length floor
/// of 8 is checked only after the hash comparison succeeds.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, or password shorter than 8
/// - `401 Unauthorized`: Invalid credentials
pub async fn sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> ApiResult<Json<SignInResponse>> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| ApiError::Unauthorized("invalid credentials".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized("invalid credentials".to_string()));
    }

    // Login floor is stricter than the registration floor; see module docs
    validate_login_password(&req.password).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let claims = jwt::Claims::new(user.id, user.role, &user.email, state.jwt_expires_in());
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    Ok(Json(SignInResponse {
        message: "logged_in".to_string(),
        user: user.public(),
        token,
    }))
}

/// Change own password
///
/// # Endpoint
///
/// ```text
/// PATCH /api/auth/change-password
/// Authorization: Bearer <token>
///
/// { "old_password": "...", "new_password": "..." }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Missing fields, new password too short, or new
///   password equal to the old one
/// - `401 Unauthorized`: Old password is incorrect
/// - `404 Not Found`: Account missing or deactivated
pub async fn change_password(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let (Some(old_password), Some(new_password)) = (req.old_password, req.new_password) else {
        return Err(ApiError::BadRequest(
            "old_password and new_password are required".to_string(),
        ));
    };

    if new_password.chars().count() < crewbase_shared::policy::LOGIN_PASSWORD_MIN {
        return Err(ApiError::BadRequest(
            "new_password must be at least 8 characters".to_string(),
        ));
    }

    let user = User::find_by_id(&state.db, actor.id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let ok = password::verify_password(&old_password, &user.password_hash)?;
    if !ok {
        return Err(ApiError::Unauthorized("Old password is incorrect".to_string()));
    }

    let same = password::verify_password(&new_password, &user.password_hash)?;
    if same {
        return Err(ApiError::BadRequest(
            "New password must be different from old password".to_string(),
        ));
    }

    let password_hash = password::hash_password(&new_password)?;
    User::update_password_hash(&state.db, user.id, &password_hash).await?;

    Ok(Json(serde_json::json!({
        "message": "Password changed successfully"
    })))
}
