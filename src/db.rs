use anyhow::{Context, Result};
use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;
use tracing::info;

use crate::config::Config;

pub async fn init_db(config: &Config) -> Result<MySqlPool> {
    let pool = MySqlPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    if config.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run database migrations")?;
        info!("Database migrations applied");
    }

    Ok(pool)
}

fn sqlstate_is(e: &sqlx::Error, state: &str) -> bool {
    match e {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(state),
        _ => false,
    }
}

/// MySQL reports duplicate keys and foreign key failures as SQLSTATE 23000
pub fn is_constraint_violation(e: &sqlx::Error) -> bool {
    sqlstate_is(e, "23000")
}

/// Deadlock victim (1213) or lock wait rollback, SQLSTATE 40001
pub fn is_serialization_failure(e: &sqlx::Error) -> bool {
    sqlstate_is(e, "40001")
}

/// Both mean a concurrent writer got there first.
pub fn is_lost_race(e: &sqlx::Error) -> bool {
    is_constraint_violation(e) || is_serialization_failure(e)
}
