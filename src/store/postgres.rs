use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{FromRow, types::Json};

use super::{Context, Record, RecordStore, StoreError, ensure_mutable};
use crate::db::DbPool;

#[derive(Debug, FromRow)]
struct RecordRow {
    context: String,
    id: String,
    attributes: Json<Map<String, Value>>,
}

impl TryFrom<RecordRow> for Record {
    type Error = StoreError;

    fn try_from(row: RecordRow) -> Result<Self, Self::Error> {
        let context = Context::parse(&row.context)
            .ok_or_else(|| StoreError::Corrupt(format!("unknown context `{}`", row.context)))?;
        Ok(Record::new(context, row.id, row.attributes.0))
    }
}

/// The shared table in PostgreSQL: `(context, id)` primary key, JSONB attributes.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
    table: String,
}

impl PgStore {
    pub fn new(pool: DbPool, table: impl Into<String>) -> Result<Self, StoreError> {
        let table = table.into();
        validate_table_name(&table)?;
        Ok(Self { pool, table })
    }
}

/// The table name is interpolated into SQL, so only plain identifiers are accepted.
pub fn validate_table_name(name: &str) -> Result<(), StoreError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if !valid || name.len() > 63 {
        return Err(StoreError::InvalidTable(name.to_string()));
    }
    Ok(())
}

#[async_trait]
impl RecordStore for PgStore {
    async fn get(&self, context: Context, id: &str) -> Result<Option<Record>, StoreError> {
        let sql = format!(
            "SELECT context, id, attributes FROM {} WHERE context = $1 AND id = $2",
            self.table
        );
        let row = sqlx::query_as::<_, RecordRow>(&sql)
            .bind(context.as_str())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Record::try_from).transpose()
    }

    async fn put(&self, record: Record) -> Result<(), StoreError> {
        let sql = format!(
            r#"
            INSERT INTO {} (context, id, attributes)
            VALUES ($1, $2, $3)
            ON CONFLICT (context, id) DO UPDATE SET attributes = EXCLUDED.attributes
            "#,
            self.table
        );
        sqlx::query(&sql)
            .bind(record.context.as_str())
            .bind(&record.id)
            .bind(Json(&record.attributes))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_field(
        &self,
        context: Context,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        ensure_mutable(field)?;
        let sql = format!(
            "UPDATE {} SET attributes = jsonb_set(attributes, ARRAY[$3::text], $4, true) \
             WHERE context = $1 AND id = $2",
            self.table
        );
        let result = sqlx::query(&sql)
            .bind(context.as_str())
            .bind(id)
            .bind(field)
            .bind(Json(&value))
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                context,
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn query_by_context(&self, context: Context) -> Result<Vec<Record>, StoreError> {
        let sql = format!(
            "SELECT context, id, attributes FROM {} WHERE context = $1",
            self.table
        );
        sqlx::query_as::<_, RecordRow>(&sql)
            .bind(context.as_str())
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Record::try_from)
            .collect()
    }

    async fn delete(&self, context: Context, id: &str) -> Result<(), StoreError> {
        let sql = format!("DELETE FROM {} WHERE context = $1 AND id = $2", self.table);
        sqlx::query(&sql)
            .bind(context.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_must_be_identifiers() {
        assert!(validate_table_name("storefront").is_ok());
        assert!(validate_table_name("_records_v2").is_ok());
        assert!(validate_table_name("").is_err());
        assert!(validate_table_name("2fast").is_err());
        assert!(validate_table_name("records; DROP TABLE users").is_err());
        assert!(validate_table_name(&"a".repeat(64)).is_err());
    }
}
