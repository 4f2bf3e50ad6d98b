//! Database pool management for the directory service.
//!
//! Opens the SeaORM connection pool (Postgres in deployments, SQLite for
//! tests), applies pending migrations and answers readiness probes.

use std::time::Duration;

use anyhow::{Context, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

use crate::config::AppConfig;

const MAX_CONNECT_ATTEMPTS: u32 = 5;
const INITIAL_BACKOFF: Duration = Duration::from_millis(100);

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("database unreachable after {attempts} attempts: {source}")]
    Unreachable {
        attempts: u32,
        #[source]
        source: DbErr,
    },
    #[error("DIRECTORY_DATABASE_URL is empty")]
    MissingUrl,
}

fn connect_options(cfg: &AppConfig) -> ConnectOptions {
    let mut options = ConnectOptions::new(cfg.database_url.trim());
    options
        .max_connections(cfg.db_max_connections)
        .acquire_timeout(Duration::from_millis(cfg.db_acquire_timeout_ms))
        .idle_timeout(Duration::from_secs(10 * 60))
        .max_lifetime(Duration::from_secs(30 * 60))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);
    options
}

/// Opens the connection pool. Failed attempts are retried with a doubling
/// delay, so a database that starts alongside the service is waited for.
///
/// ```no_run
/// use directory::{config::AppConfig, db};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let pool = db::init_pool(&AppConfig::default()).await?;
///     db::run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```
pub async fn init_pool(cfg: &AppConfig) -> Result<DatabaseConnection> {
    if cfg.database_url.trim().is_empty() {
        return Err(DatabaseError::MissingUrl.into());
    }

    let options = connect_options(cfg);
    let mut backoff = INITIAL_BACKOFF;
    let mut attempt = 0;

    loop {
        attempt += 1;
        let err = match Database::connect(options.clone()).await {
            Ok(pool) => {
                log::info!("Database pool ready after {} attempt(s)", attempt);
                return Ok(pool);
            }
            Err(err) => err,
        };

        if attempt == MAX_CONNECT_ATTEMPTS {
            log::error!("Giving up on the database: {}", err);
            return Err(DatabaseError::Unreachable {
                attempts: attempt,
                source: err,
            }
            .into());
        }

        log::warn!(
            "Database connection attempt {}/{} failed ({}); next try in {:?}",
            attempt,
            MAX_CONNECT_ATTEMPTS,
            err,
            backoff
        );
        tokio::time::sleep(backoff).await;
        backoff *= 2;
    }
}

/// Applies every pending schema migration.
pub async fn run_migrations(db: &DatabaseConnection) -> Result<()> {
    Migrator::up(db, None)
        .await
        .context("applying database migrations")?;
    log::info!("Database schema is up to date");
    Ok(())
}

/// Round-trips `SELECT 1` through the pool.
pub async fn health_check(db: &DatabaseConnection) -> Result<()> {
    db.query_one(Statement::from_string(
        db.get_database_backend(),
        "SELECT 1".to_string(),
    ))
    .await
    .context("database health check")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn blank_database_url_is_rejected() {
        let config = AppConfig {
            database_url: "  ".to_string(),
            ..Default::default()
        };

        let err = init_pool(&config).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DatabaseError>(),
            Some(DatabaseError::MissingUrl)
        ));
    }

    #[tokio::test]
    async fn sqlite_pool_migrates_twice_and_stays_healthy() {
        let config = AppConfig {
            database_url: "sqlite::memory:".to_string(),
            db_max_connections: 1,
            ..Default::default()
        };

        let db = init_pool(&config).await.unwrap();
        run_migrations(&db).await.unwrap();
        run_migrations(&db).await.unwrap();
        health_check(&db).await.unwrap();
    }
}
