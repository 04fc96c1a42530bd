use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::gateway::Gateway;

pub mod doc;
pub mod health;
pub mod invoke;

pub fn create_router(gateway: Arc<Gateway>) -> Router {
    Router::new()
        .route("/", post(invoke::invoke).options(invoke::preflight))
        .route("/health", get(health::health_check))
        .merge(doc::scalar_docs())
        .with_state(gateway)
}
