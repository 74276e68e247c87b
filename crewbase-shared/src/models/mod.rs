/// Database models for Crewbase
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts with role and activation state
/// - `task`: Task records with a soft/hard delete axis
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
/// let user = User::create(
///     &pool,
///     CreateUser {
///         name: "Jane Doe".to_string(),
///         email: "jane@example.com".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///         role: Role::User,
///         is_active: true,
///     },
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```

pub mod task;
pub mod user;
