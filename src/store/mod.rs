use std::{fmt, sync::Arc};

use async_trait::async_trait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::task::JoinSet;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Partition of the shared table a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Context {
    User,
    Item,
    Order,
}

impl Context {
    pub fn as_str(self) -> &'static str {
        match self {
            Context::User => "user",
            Context::Item => "item",
            Context::Order => "order",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Context::User),
            "item" => Some(Context::Item),
            "order" => Some(Context::Order),
            _ => None,
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{context}/{id} does not exist")]
    NotFound { context: Context, id: String },

    #[error("key field `{0}` cannot be updated")]
    KeyField(String),

    #[error("invalid table name `{0}`")]
    InvalidTable(String),

    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("backend error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// One row of the shared table. Serializes flat: `{ "context", "id", ...attributes }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub context: Context,
    pub id: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Record {
    pub fn new(context: Context, id: impl Into<String>, attributes: Map<String, Value>) -> Self {
        Self {
            context,
            id: id.into(),
            attributes,
        }
    }

    /// Builds a record from a model whose serialized form carries an `id` string.
    pub fn from_model<T: Serialize>(context: Context, model: &T) -> Result<Self, StoreError> {
        let value = serde_json::to_value(model).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let Value::Object(mut attributes) = value else {
            return Err(StoreError::Corrupt("model is not an object".into()));
        };
        attributes.remove("context");
        let id = match attributes.remove("id") {
            Some(Value::String(id)) => id,
            _ => return Err(StoreError::Corrupt("model has no string id".into())),
        };
        Ok(Self::new(context, id, attributes))
    }

    /// Attributes with `id` folded back in, as returned to callers.
    pub fn into_attributes(self) -> Map<String, Value> {
        let mut attributes = self.attributes;
        attributes.insert("id".to_string(), Value::String(self.id));
        attributes
    }

    pub fn into_model<T: DeserializeOwned>(self) -> Result<T, StoreError> {
        let context = self.context;
        let id = self.id.clone();
        serde_json::to_value(self)
            .and_then(serde_json::from_value)
            .map_err(|e| StoreError::Corrupt(format!("{context}/{id}: {e}")))
    }
}

pub(crate) fn ensure_mutable(field: &str) -> Result<(), StoreError> {
    if field == "context" || field == "id" {
        return Err(StoreError::KeyField(field.to_string()));
    }
    Ok(())
}

#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    async fn get(&self, context: Context, id: &str) -> Result<Option<Record>, StoreError>;

    /// Full upsert keyed by `(record.context, record.id)`.
    async fn put(&self, record: Record) -> Result<(), StoreError>;

    /// Sets one attribute on an existing record. Never creates a record.
    async fn update_field(
        &self,
        context: Context,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError>;

    /// All records of a partition, in no particular order.
    async fn query_by_context(&self, context: Context) -> Result<Vec<Record>, StoreError>;

    async fn delete(&self, context: Context, id: &str) -> Result<(), StoreError>;
}

#[derive(Debug)]
pub struct PutOutcome {
    pub context: Context,
    pub id: String,
    pub result: Result<(), StoreError>,
}

impl PutOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Upserts every record concurrently and waits for all of them.
///
/// Outcomes come back in input order. Writes that succeeded are kept even
/// when others fail; retry or rollback is up to the caller.
pub async fn batch_put(store: Arc<dyn RecordStore>, records: Vec<Record>) -> Vec<PutOutcome> {
    let keys: Vec<(Context, String)> = records.iter().map(|r| (r.context, r.id.clone())).collect();
    let mut results: Vec<Option<Result<(), StoreError>>> = keys.iter().map(|_| None).collect();

    let mut set = JoinSet::new();
    for (index, record) in records.into_iter().enumerate() {
        let store = Arc::clone(&store);
        set.spawn(async move { (index, store.put(record).await) });
    }

    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((index, result)) => {
                if let Some(slot) = results.get_mut(index) {
                    *slot = Some(result);
                }
            }
            Err(err) => tracing::error!(error = %err, "seed write task aborted"),
        }
    }

    keys.into_iter()
        .zip(results)
        .map(|((context, id), result)| PutOutcome {
            context,
            id,
            result: result
                .unwrap_or_else(|| Err(StoreError::Backend("write task did not complete".into()))),
        })
        .collect()
}
