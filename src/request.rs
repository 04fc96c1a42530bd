use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{
    error::{AppError, AppResult},
    token::{Identity, TokenService},
};

/// Inbound event as handed over by the transport.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    #[serde(default)]
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
    pub query: Option<HashMap<String, String>>,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub method: String,
    pub source_ip: Option<String>,
    /// Caller agent reported by the transport, used when no header is present.
    pub user_agent: Option<String>,
}

impl RawEvent {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct NormalizedRequest {
    pub body: Map<String, Value>,
    pub query: HashMap<String, String>,
    pub path: String,
    pub method: String,
    pub source_ip: Option<String>,
    pub identity: Identity,
    pub api_key: Option<String>,
    pub user_agent: Option<String>,
}

impl NormalizedRequest {
    pub fn action(&self) -> Option<&str> {
        self.body.get("action").and_then(Value::as_str)
    }

    pub fn data(&self) -> Value {
        self.body.get("data").cloned().unwrap_or(Value::Null)
    }
}

pub fn normalize(event: RawEvent, tokens: &TokenService) -> AppResult<NormalizedRequest> {
    let body = parse_body(event.body.as_deref())?;
    let identity = tokens.verify(event.header("authorization"));
    let api_key = event.header("x-api-key").map(str::to_string);
    let user_agent = event
        .header("user-agent")
        .map(str::to_string)
        .or_else(|| event.user_agent.clone());
    let source_ip = event.source_ip.clone().or_else(|| {
        event
            .header("x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string())
    });

    Ok(NormalizedRequest {
        body,
        query: event.query.unwrap_or_default(),
        path: event.path,
        method: event.method,
        source_ip,
        identity,
        api_key,
        user_agent,
    })
}

/// Absent or blank bodies are empty; anything else must be a JSON object.
fn parse_body(body: Option<&str>) -> AppResult<Map<String, Value>> {
    let Some(raw) = body.filter(|b| !b.trim().is_empty()) else {
        return Ok(Map::new());
    };
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AppError::BadRequest("request body must be a JSON object".into())),
        Err(err) => Err(AppError::BadRequest(format!("malformed JSON body: {err}"))),
    }
}
