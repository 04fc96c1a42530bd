use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

pub mod auth;

/// Body every action call carries.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ActionRequest {
    pub action: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub data: Value,
}

#[derive(Debug, Deserialize)]
pub struct IdRequest {
    pub id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
