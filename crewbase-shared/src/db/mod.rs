/// Database layer for Crewbase
///
/// This module provides connection pooling and the migration runner. The
/// models themselves live in the `models` module at the crate root.
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool management with health checks
/// - `migrations`: sqlx migration runner for the `migrations/` directory
///
/// # Example
///
/// ```no_run
/// use crewbase_shared::db::pool::{create_pool, DatabaseConfig};
/// use crewbase_shared::db::migrations::run_migrations;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///     run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
