use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    dto::IdRequest,
    error::AppResult,
    state::AppState,
    store::{Context, Record},
};

pub async fn list_items(state: &AppState) -> AppResult<Vec<Map<String, Value>>> {
    let items = state
        .store
        .query_by_context(Context::Item)
        .await?
        .into_iter()
        .map(Record::into_attributes)
        .collect();
    Ok(items)
}

pub async fn add_item(state: &AppState, mut attributes: Map<String, Value>) -> AppResult<()> {
    attributes.remove("id");
    attributes.remove("context");

    let id = Uuid::new_v4().to_string();
    state
        .store
        .put(Record::new(Context::Item, id.clone(), attributes))
        .await?;
    tracing::info!(item_id = %id, "item added");
    Ok(())
}

pub async fn remove_item(state: &AppState, payload: IdRequest) -> AppResult<()> {
    state.store.delete(Context::Item, &payload.id).await?;
    tracing::info!(item_id = %payload.id, "item removed");
    Ok(())
}
