use std::{collections::HashMap, net::SocketAddr, sync::Arc};

use axum::{
    body::to_bytes,
    extract::{ConnectInfo, Query, Request, State},
};

use crate::{
    dto::ActionRequest, error::AppError, gateway::Gateway, request::RawEvent, response::Envelope,
};

pub const BODY_LIMIT: usize = 1024 * 1024;

#[utoipa::path(
    post,
    path = "/",
    request_body = ActionRequest,
    responses(
        (status = 200, description = "Action result, or `{success:false,error}` when the action failed"),
        (status = 400, description = "Body is not a JSON object")
    ),
    tag = "Actions"
)]
pub async fn invoke(State(gateway): State<Arc<Gateway>>, request: Request) -> Envelope {
    let (parts, body) = request.into_parts();

    let body = match to_bytes(body, BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(err) => return Envelope::bad_request(&AppError::BadRequest(err.to_string())),
    };
    let body = match String::from_utf8(body.to_vec()) {
        Ok(text) => text,
        Err(_) => {
            return Envelope::bad_request(&AppError::BadRequest("body is not UTF-8".into()));
        }
    };

    let headers = parts
        .headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    let query = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
        .map(|Query(q)| q)
        .ok();
    let source_ip = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string());

    let event = RawEvent {
        headers,
        body: Some(body).filter(|b| !b.is_empty()),
        query,
        path: parts.uri.path().to_string(),
        method: parts.method.to_string(),
        source_ip,
        user_agent: None,
    };

    gateway.handle(event).await
}

pub async fn preflight() -> Envelope {
    Envelope::empty()
}
