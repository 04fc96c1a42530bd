use anyhow::Result;
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::store::postgres::validate_table_name;

pub type DbPool = PgPool;

pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Creates the shared record table if it does not exist yet.
pub async fn ensure_table(pool: &DbPool, table: &str) -> Result<()> {
    validate_table_name(table)?;
    let sql = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            context TEXT NOT NULL,
            id TEXT NOT NULL,
            attributes JSONB NOT NULL DEFAULT '{{}}'::jsonb,
            PRIMARY KEY (context, id)
        )
        "#
    );
    sqlx::query(&sql).execute(pool).await?;
    Ok(())
}
