use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use storefront_gateway::{
    credentials::StoredValueVerifier,
    gateway::Gateway,
    request::RawEvent,
    state::AppState,
    store::{Context, MemoryStore, Record, RecordStore, StoreError},
    token::TokenService,
};

/// Memory store that refuses every write into one context.
struct RejectingStore {
    inner: MemoryStore,
    reject: Context,
}

#[async_trait]
impl RecordStore for RejectingStore {
    async fn get(&self, context: Context, id: &str) -> Result<Option<Record>, StoreError> {
        self.inner.get(context, id).await
    }

    async fn put(&self, record: Record) -> Result<(), StoreError> {
        if record.context == self.reject {
            return Err(StoreError::Backend("throttled".into()));
        }
        self.inner.put(record).await
    }

    async fn update_field(
        &self,
        context: Context,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        self.inner.update_field(context, id, field, value).await
    }

    async fn query_by_context(&self, context: Context) -> Result<Vec<Record>, StoreError> {
        if context == self.reject {
            return Err(StoreError::Backend("throttled".into()));
        }
        self.inner.query_by_context(context).await
    }

    async fn delete(&self, context: Context, id: &str) -> Result<(), StoreError> {
        self.inner.delete(context, id).await
    }
}

fn gateway_rejecting(reject: Context) -> (Gateway, MemoryStore) {
    let inner = MemoryStore::new();
    let store = RejectingStore {
        inner: inner.clone(),
        reject,
    };
    let state = AppState::new(
        Arc::new(store),
        TokenService::new(b"secret"),
        Arc::new(StoredValueVerifier),
    );
    (Gateway::new(state), inner)
}

fn event(action: &str, data: Value) -> RawEvent {
    RawEvent {
        body: Some(json!({ "action": action, "data": data }).to_string()),
        ..RawEvent::default()
    }
}

#[tokio::test]
async fn failed_seed_writes_surface_but_successful_ones_stay() {
    let (gateway, inner) = gateway_rejecting(Context::Item);

    let envelope = gateway.handle(event("INIT", json!({}))).await;
    assert_eq!(envelope.status_code, 200);
    let body = envelope.json_body().unwrap();
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("seed_failed"));

    assert!(inner.query_by_context(Context::Item).await.unwrap().is_empty());
    assert_eq!(inner.query_by_context(Context::Order).await.unwrap().len(), 2);
    assert!(inner.get(Context::User, "admin").await.unwrap().is_some());
}

#[tokio::test]
async fn store_errors_become_failure_envelopes() {
    let (gateway, _) = gateway_rejecting(Context::Order);

    let envelope = gateway
        .handle(event(
            "ADD_ORDER",
            json!({ "title": "Hat", "price": 5, "buyerName": "A", "buyerAddress": "B" }),
        ))
        .await;
    assert_eq!(envelope.status_code, 200);
    let body = envelope.json_body().unwrap();
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("store_error"));

    let envelope = gateway.handle(event("ORDER_LIST", json!({}))).await;
    assert_eq!(envelope.json_body().unwrap()["error"], json!("store_error"));
}
