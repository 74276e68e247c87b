/// Session token generation and validation
///
/// Session tokens are JWTs signed with HS256 (HMAC-SHA256). The claims
/// carry the subject id, role, and email of the authenticated user — enough
/// for the policy layer to build an [`crate::policy::Actor`] without a
/// database round-trip.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Expiration**: configurable per token, default 1 hour
/// - **Validation**: signature, expiration, not-before, and issuer checks
/// - **Secret Management**: secrets should be at least 32 bytes (256 bits)
///
/// Tokens are stateless: there is no revocation list, so expiry is the only
/// way a token stops working.
///
/// # Example
///
/// ```
/// use crewbase_shared::auth::jwt::{create_token, validate_token, Claims};
/// use crewbase_shared::models::user::Role;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
/// let claims = Claims::new(user_id, Role::Manager, "lead@example.com", 3600);
/// let token = create_token(&claims, "your-secret-key-at-least-32-bytes")?;
///
/// let validated = validate_token(&token, "your-secret-key-at-least-32-bytes")?;
/// assert_eq!(validated.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::Role;
use crate::policy::Actor;

/// Issuer written into and required from every token
pub const ISSUER: &str = "crewbase";

/// Default token lifetime in seconds (1 hour)
pub const DEFAULT_EXPIRY_SECONDS: i64 = 3600;

/// Error type for session token operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Invalid issuer
    #[error("Invalid issuer")]
    InvalidIssuer,
}

/// Session token claims
///
/// # Standard Claims
///
/// - `sub`: Subject (user ID)
/// - `iss`: Issuer (always "crewbase")
/// - `iat` / `exp` / `nbf`: issued-at, expiry, not-before timestamps
///
/// # Custom Claims
///
/// - `role`: the subject's role at issue time
/// - `email`: the subject's email at issue time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: Uuid,

    /// Subject's role at issue time
    pub role: Role,

    /// Subject's email at issue time
    pub email: String,

    /// Issuer - always "crewbase"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Creates claims expiring `expires_in_seconds` from now
    pub fn new(user_id: Uuid, role: Role, email: &str, expires_in_seconds: i64) -> Self {
        let now = Utc::now();
        let expiration = now + Duration::seconds(expires_in_seconds);

        Self {
            sub: user_id,
            role,
            email: email.to_string(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
        }
    }

    /// Checks if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Builds the policy-layer actor these claims describe
    pub fn actor(&self) -> Actor {
        Actor {
            id: self.sub,
            role: self.role,
            email: self.email.clone(),
        }
    }
}

/// Creates a signed session token from claims
///
/// # Security
///
/// The secret should be at least 32 bytes, randomly generated, and stored
/// outside the repository (environment variable or secret manager).
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a session token and extracts its claims
///
/// Verifies the signature, the expiry, the not-before time, and that the
/// issuer is "crewbase".
///
/// # Errors
///
/// Returns `JwtError::Expired` for expired tokens, `JwtError::InvalidIssuer`
/// for a wrong issuer, and `JwtError::ValidationError` for everything else
/// (bad signature, malformed token, missing claims).
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}
