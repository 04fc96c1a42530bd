use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Open,
    Closed,
}

impl OrderStatus {
    /// Every order starts here, whatever the caller sent.
    pub const INITIAL: OrderStatus = OrderStatus::Open;
}

/// Both transitions apply from any state; repeating one is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderTransition {
    Complete,
    Reopen,
}

impl OrderTransition {
    pub fn target(self) -> OrderStatus {
        match self {
            OrderTransition::Complete => OrderStatus::Closed,
            OrderTransition::Reopen => OrderStatus::Open,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub password: String,
    #[serde(default)]
    pub info: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Item {
    pub id: String,
    pub title: String,
    #[schema(value_type = f64)]
    pub price: Number,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub title: String,
    #[schema(value_type = f64)]
    pub price: Number,
    pub buyer_name: String,
    pub buyer_address: String,
    pub order_status: OrderStatus,
}
