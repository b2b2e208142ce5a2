use crate::config::DatabaseConfig;
use crate::database::postgres_repository::PostgresRepository;
use rocket::fairing::AdHoc;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use std::time::Duration;

/// Statements run at startup so the users table and its indexes exist.
pub(crate) const ENSURE_SCHEMA: [&str; 4] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        first_name TEXT NOT NULL DEFAULT '',
        last_name TEXT NOT NULL DEFAULT '',
        nickname TEXT NOT NULL,
        password TEXT NOT NULL,
        email TEXT NOT NULL,
        country TEXT NOT NULL DEFAULT '',
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS users_id_country_idx ON users (id, country)",
    "CREATE UNIQUE INDEX IF NOT EXISTS users_nickname_email_key ON users (nickname, email)",
    "CREATE INDEX IF NOT EXISTS users_nickname_country_idx ON users (nickname, country)",
];

async fn init_pool(db_config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let statement_timeout = format!("SET statement_timeout = {}", db_config.query_timeout_ms);

    PgPoolOptions::new()
        .max_connections(db_config.max_connections)
        .min_connections(db_config.min_connections)
        .acquire_timeout(Duration::from_secs(db_config.acquire_timeout))
        .idle_timeout(Duration::from_secs(30))
        .max_lifetime(Duration::from_secs(1800))
        .after_connect(move |conn, _meta| {
            let statement_timeout = statement_timeout.clone();
            Box::pin(async move {
                conn.execute(statement_timeout.as_str()).await?;
                Ok(())
            })
        })
        .connect(&db_config.url)
        .await
}

async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in ENSURE_SCHEMA {
        pool.execute(statement).await?;
    }
    Ok(())
}

pub fn stage_db(db_config: DatabaseConfig) -> AdHoc {
    AdHoc::try_on_ignite("Postgres (sqlx)", |rocket| async move {
        let pool = match init_pool(&db_config).await {
            Ok(pool) => pool,
            Err(e) => {
                tracing::error!("Failed to initialize database pool: {}", e);
                return Err(rocket);
            }
        };

        if let Err(e) = ensure_schema(&pool).await {
            tracing::error!("Failed to ensure users schema: {}", e);
            return Err(rocket);
        }

        tracing::info!(query_timeout_ms = db_config.query_timeout_ms, "Database pool initialized successfully");
        let repository = PostgresRepository::new(pool, Duration::from_millis(db_config.query_timeout_ms));
        Ok(rocket.manage(repository))
    })
}
