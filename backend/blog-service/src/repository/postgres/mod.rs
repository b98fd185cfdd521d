/// PostgreSQL-backed entity store
///
/// One [`PgRepository`] implements every repository trait; the impls are
/// split per record family across the sibling modules.
mod categories;
mod comments;
mod posts;
mod ratings;
mod tags;
mod users;

use crate::config::DatabaseConfig;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, error, info};

#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the bundled schema
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations executed");
        Ok(())
    }
}

/// Create a PostgreSQL connection pool and verify it answers
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    debug!(
        "Creating database pool: max={}, min={}, acquire_timeout={}s",
        config.max_connections, config.min_connections, config.acquire_timeout_secs
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .test_before_acquire(true)
        .connect(&config.url)
        .await?;

    match sqlx::query("SELECT 1").execute(&pool).await {
        Ok(_) => {
            info!("Database pool created and verified successfully");
            Ok(pool)
        }
        Err(e) => {
            error!(error = %e, "Database connection verification failed");
            Err(e)
        }
    }
}
