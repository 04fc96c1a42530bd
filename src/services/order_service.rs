use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::{
    dto::{IdRequest, SuccessResponse},
    error::AppResult,
    models::{OrderStatus, OrderTransition},
    state::AppState,
    store::{Context, Record},
};

pub const STATUS_FIELD: &str = "orderStatus";

/// Stores the caller's fields as given, under a fresh id and with the initial status.
pub async fn create_order(
    state: &AppState,
    mut attributes: Map<String, Value>,
) -> AppResult<SuccessResponse> {
    attributes.remove("id");
    attributes.remove("context");
    attributes.insert(STATUS_FIELD.to_string(), json!(OrderStatus::INITIAL));

    let id = Uuid::new_v4().to_string();
    state
        .store
        .put(Record::new(Context::Order, id.clone(), attributes))
        .await?;
    tracing::info!(order_id = %id, "order created");
    Ok(SuccessResponse::ok())
}

pub async fn complete_order(state: &AppState, payload: IdRequest) -> AppResult<SuccessResponse> {
    transition_order(state, &payload.id, OrderTransition::Complete).await
}

pub async fn reopen_order(state: &AppState, payload: IdRequest) -> AppResult<SuccessResponse> {
    transition_order(state, &payload.id, OrderTransition::Reopen).await
}

async fn transition_order(
    state: &AppState,
    id: &str,
    transition: OrderTransition,
) -> AppResult<SuccessResponse> {
    let target = transition.target();
    state
        .store
        .update_field(Context::Order, id, STATUS_FIELD, json!(target))
        .await?;
    tracing::info!(order_id = %id, status = ?target, "order status changed");
    Ok(SuccessResponse::ok())
}

pub async fn list_orders(state: &AppState) -> AppResult<Vec<Map<String, Value>>> {
    let orders = state
        .store
        .query_by_context(Context::Order)
        .await?
        .into_iter()
        .map(Record::into_attributes)
        .collect();
    Ok(orders)
}
