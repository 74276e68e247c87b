/// Authentication utilities
///
/// This module provides the secure authentication primitives for Crewbase:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Session token generation and validation
/// - [`middleware`]: Axum middleware that turns a bearer token into an
///   [`crate::policy::Actor`] threaded through request extensions
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **Session Tokens**: HS256 signing, configurable expiry (default 1 hour)
/// - **Statelessness**: token validity is signature + expiry only; there is
///   no revocation list
///
/// # Example
///
/// ```no_run
/// use crewbase_shared::auth::password::{hash_password, verify_password};
/// use crewbase_shared::auth::jwt::{create_token, validate_token, Claims};
/// use crewbase_shared::models::user::Role;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let claims = Claims::new(Uuid::new_v4(), Role::User, "user@example.com", 3600);
/// let token = create_token(&claims, "secret-key-at-least-32-bytes-long!!")?;
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
