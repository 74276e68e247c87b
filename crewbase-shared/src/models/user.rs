/// User model and database operations
///
/// This module provides the User model and CRUD operations for managing
/// user accounts. Passwords are stored as Argon2id hashes, never plaintext,
/// and the hash column is never serialized to clients.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('admin', 'manager', 'user');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL,
///     password_hash VARCHAR(255) NOT NULL,
///     role user_role NOT NULL DEFAULT 'user',
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Email uniqueness is case-insensitive, enforced by a unique index on
/// `LOWER(email)`. Lookups by email go through the same expression.
///
/// # Example
///
/// ```no_run
/// use crewbase_shared::models::user::{CreateUser, Role, User};
/// use crewbase_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     name: "Jane Doe".to_string(),
///     email: "Jane@Example.com".to_string(), // stored lowercased
///     password_hash: "$argon2id$...".to_string(),
///     role: Role::User,
///     is_active: true,
/// }).await?;
///
/// let found = User::find_by_email(&pool, "jane@example.com").await?;
/// assert!(found.is_some());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Role held by a user account
///
/// Roles are flat, not hierarchical: permissions are looked up per
/// (role, operation) in [`crate::policy::PERMISSION_TABLE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full administrative access
    Admin,

    /// User management access (same grants as admin in this system)
    Manager,

    /// Regular account
    User,
}

/// All valid roles, in the order they are listed in error messages
pub const ALL_ROLES: [Role; 3] = [Role::Admin, Role::Manager, Role::User];

impl Role {
    /// Converts role to its wire/database string
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "user" => Ok(Role::User),
            _ => Err("Invalid role. Use: admin, manager, user".to_string()),
        }
    }
}

/// User model representing an account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address, stored lowercased
    pub email: String,

    /// Argon2id password hash
    ///
    /// Never serialized in responses; see [`User::public`]
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Account role
    pub role: Role,

    /// Whether the account may sign in
    pub is_active: bool,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Client-safe projection of a user record
///
/// This is the only user shape ever returned by the API: the credential
/// field does not exist on it, so it cannot leak.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PublicUser {
    /// Unique user ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Account role
    pub role: Role,

    /// Whether the account may sign in
    pub is_active: bool,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Strips the credential field for client responses
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            is_active: self.is_active,
            created_at: self.created_at,
        }
    }
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Display name
    pub name: String,

    /// Email address (lowercased before insert)
    pub email: String,

    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: String,

    /// Account role
    pub role: Role,

    /// Initial activation state
    pub is_active: bool,
}

/// Fields an admin update may change
///
/// All fields are optional; only `Some` fields are written. Whether `role`
/// may be set at all is decided by [`crate::policy::plan_user_update`], not
/// here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserFields {
    /// New display name
    pub name: Option<String>,

    /// New role
    pub role: Option<Role>,

    /// New activation state
    pub is_active: Option<bool>,
}

impl User {
    /// Creates a new user in the database
    ///
    /// The email is lowercased before insert so that the case-insensitive
    /// unique index compares against a canonical form.
    ///
    /// # Errors
    ///
    /// Returns an error if the email already exists (unique constraint
    /// violation) or the database is unreachable.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, role, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, password_hash, role, is_active, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.email.to_lowercase())
        .bind(data.password_hash)
        .bind(data.role)
        .bind(data.is_active)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    ///
    /// # Returns
    ///
    /// The user if found, None otherwise
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, role, is_active, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address (case-insensitive)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, role, is_active, created_at, updated_at
            FROM users
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Applies an admin update to a user record
    ///
    /// Only `Some` fields in `data` are written; `updated_at` is always
    /// refreshed. Callers must have run the update through
    /// [`crate::policy::plan_user_update`] first.
    ///
    /// # Returns
    ///
    /// The updated user if found, None if the id does not resolve
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUserFields,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.role.is_some() {
            bind_count += 1;
            query.push_str(&format!(", role = ${}", bind_count));
        }
        if data.is_active.is_some() {
            bind_count += 1;
            query.push_str(&format!(", is_active = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, name, email, password_hash, role, is_active, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(role) = data.role {
            q = q.bind(role);
        }
        if let Some(is_active) = data.is_active {
            q = q.bind(is_active);
        }

        let user = q.fetch_optional(pool).await?;

        Ok(user)
    }

    /// Sets the activation flag on a user record
    ///
    /// # Returns
    ///
    /// The updated user if found, None if the id does not resolve
    pub async fn set_active(
        pool: &PgPool,
        id: Uuid,
        active: bool,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET is_active = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, email, password_hash, role, is_active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(active)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Replaces the stored credential hash
    ///
    /// # Returns
    ///
    /// True if the user was found and updated, false otherwise
    pub async fn update_password_hash(
        pool: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a user by ID
    ///
    /// Permanent removal; there is no soft-delete state for users.
    ///
    /// # Returns
    ///
    /// True if a row was deleted, false if the user didn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists users matching an optional free-text filter, newest first
    ///
    /// The filter is a case-insensitive substring match against name OR
    /// email. Pagination is plain LIMIT/OFFSET; callers compute the offset
    /// from page and limit.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use crewbase_shared::models::user::User;
    /// # use sqlx::PgPool;
    /// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
    /// // Second page of 10, filtered
    /// let page2 = User::search(&pool, Some("doe"), 10, 10).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn search(
        pool: &PgPool,
        filter: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let users = match filter {
            Some(q) if !q.is_empty() => {
                let pattern = format!("%{}%", q);
                sqlx::query_as::<_, User>(
                    r#"
                    SELECT id, name, email, password_hash, role, is_active, created_at, updated_at
                    FROM users
                    WHERE name ILIKE $1 OR email ILIKE $1
                    ORDER BY created_at DESC
                    LIMIT $2 OFFSET $3
                    "#,
                )
                .bind(pattern)
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
            }
            _ => {
                sqlx::query_as::<_, User>(
                    r#"
                    SELECT id, name, email, password_hash, role, is_active, created_at, updated_at
                    FROM users
                    ORDER BY created_at DESC
                    LIMIT $1 OFFSET $2
                    "#,
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
            }
        };

        Ok(users)
    }

    /// Fetches several users by ID in one query
    ///
    /// Missing ids are silently absent from the result. Used to resolve
    /// owner/creator references when listing tasks.
    pub async fn find_by_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, role, is_active, created_at, updated_at
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Counts users matching the same filter as [`User::search`]
    pub async fn count(pool: &PgPool, filter: Option<&str>) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = match filter {
            Some(q) if !q.is_empty() => {
                let pattern = format!("%{}%", q);
                sqlx::query_as("SELECT COUNT(*) FROM users WHERE name ILIKE $1 OR email ILIKE $1")
                    .bind(pattern)
                    .fetch_one(pool)
                    .await?
            }
            _ => {
                sqlx::query_as("SELECT COUNT(*) FROM users")
                    .fetch_one(pool)
                    .await?
            }
        };

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in ALL_ROLES {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_role_parse_invalid() {
        let err = "superuser".parse::<Role>().unwrap_err();
        assert_eq!(err, "Invalid role. Use: admin, manager, user");
    }

    #[test]
    fn test_role_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Manager).unwrap(), "\"manager\"");
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }

    #[test]
    fn test_public_projection_has_no_credential() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Test".to_string(),
            email: "test@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: Role::User,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(user.public()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "test@example.com");
    }

    #[test]
    fn test_user_serialize_skips_credential() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Test".to_string(),
            email: "test@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: Role::Admin,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
    }

    // Integration tests for database operations live in the api crate's
    // tests/ directory, which has a running Postgres available.
}
