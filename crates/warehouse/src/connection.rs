use crate::error::WarehouseError;
use configuration::WarehouseSettings;
use dotenvy::dotenv;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::env;
use std::time::Duration;

/// Establishes a connection pool to the warehouse database.
///
/// This function reads the `DATABASE_URL` from the environment (loading a
/// `.env` file first when one exists), creates a connection pool sized from
/// the `[warehouse]` settings, and returns it. This pool can be shared
/// across the entire application.
pub async fn connect(settings: &WarehouseSettings) -> Result<PgPool, WarehouseError> {
    // A missing .env file is fine; the variable may already be exported.
    dotenv().ok();

    let database_url = env::var("DATABASE_URL").map_err(|_e| {
        WarehouseError::ConnectionConfigError("DATABASE_URL must be set.".to_string())
    })?;

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .connect(&database_url)
        .await?;

    Ok(pool)
}

/// A utility function to run database migrations automatically.
///
/// This is useful for ensuring the warehouse schema is up-to-date when the
/// application starts.
pub async fn run_migrations(pool: &PgPool) -> Result<(), WarehouseError> {
    // Use a relative path from the crate root
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
