use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use super::{Context, Record, RecordStore, StoreError, ensure_mutable};

type Key = (Context, String);

/// Process-local table, used when no database is configured and in tests.
#[derive(Clone)]
pub struct MemoryStore {
    map: Arc<DashMap<Key, Record>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            map: Arc::new(DashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self, context: Context, id: &str) -> Result<Option<Record>, StoreError> {
        Ok(self
            .map
            .get(&(context, id.to_string()))
            .map(|r| r.value().clone()))
    }

    async fn put(&self, record: Record) -> Result<(), StoreError> {
        self.map.insert((record.context, record.id.clone()), record);
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
        match self.map.get_mut(&(context, id.to_string())) {
            Some(mut record) => {
                record.attributes.insert(field.to_string(), value);
                Ok(())
            }
            None => Err(StoreError::NotFound {
                context,
                id: id.to_string(),
            }),
        }
    }

    async fn query_by_context(&self, context: Context) -> Result<Vec<Record>, StoreError> {
        Ok(self
            .map
            .iter()
            .filter(|kv| kv.key().0 == context)
            .map(|kv| kv.value().clone())
            .collect())
    }

    async fn delete(&self, context: Context, id: &str) -> Result<(), StoreError> {
        self.map.remove(&(context, id.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, json};

    fn titled(context: Context, id: &str, title: &str) -> Record {
        let mut attributes = Map::new();
        attributes.insert("title".into(), json!(title));
        Record::new(context, id, attributes)
    }

    #[tokio::test]
    async fn same_id_in_different_contexts_does_not_collide() {
        let store = MemoryStore::new();
        store.put(titled(Context::Item, "1", "item")).await.unwrap();
        store.put(titled(Context::Order, "1", "order")).await.unwrap();

        let item = store.get(Context::Item, "1").await.unwrap().unwrap();
        let order = store.get(Context::Order, "1").await.unwrap().unwrap();
        assert_eq!(item.attributes["title"], json!("item"));
        assert_eq!(order.attributes["title"], json!("order"));
        assert_eq!(store.query_by_context(Context::Item).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_field_on_missing_record_does_not_create_it() {
        let store = MemoryStore::new();
        let err = store
            .update_field(Context::Order, "ghost", "orderStatus", json!("OPEN"))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::NotFound { .. }));
        assert!(store.get(Context::Order, "ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_field_keeps_other_attributes() {
        let store = MemoryStore::new();
        store.put(titled(Context::Order, "o", "Hat")).await.unwrap();
        store
            .update_field(Context::Order, "o", "orderStatus", json!("CLOSED"))
            .await
            .unwrap();

        let order = store.get(Context::Order, "o").await.unwrap().unwrap();
        assert_eq!(order.attributes["title"], json!("Hat"));
        assert_eq!(order.attributes["orderStatus"], json!("CLOSED"));
    }

    #[tokio::test]
    async fn clones_share_one_table() {
        let store = MemoryStore::new();
        let handle = store.clone();
        handle.put(titled(Context::Order, "o", "Hat")).await.unwrap();

        assert!(store.get(Context::Order, "o").await.unwrap().is_some());
        assert!(
            handle
                .update_field(Context::Order, "missing", "orderStatus", json!("OPEN"))
                .await
                .is_err()
        );
        assert_eq!(store.query_by_context(Context::Order).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryStore::new();
        store.put(titled(Context::Item, "x", "Pen")).await.unwrap();
        store.delete(Context::Item, "x").await.unwrap();
        store.delete(Context::Item, "x").await.unwrap();
        assert!(store.get(Context::Item, "x").await.unwrap().is_none());
    }
}
