use std::collections::BTreeMap;

use axum::{
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::AppError;

/// Uniform wrapper returned for every call: status, headers, serialized body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

fn cors_headers() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
        ("Access-Control-Allow-Headers".to_string(), "*".to_string()),
        ("Access-Control-Allow-Methods".to_string(), "*".to_string()),
        ("Content-Type".to_string(), "application/json".to_string()),
    ])
}

impl Envelope {
    pub fn with_status(status: StatusCode, body: &Value) -> Self {
        Self {
            status_code: status.as_u16(),
            headers: cors_headers(),
            body: body.to_string(),
        }
    }

    pub fn ok(body: &Value) -> Self {
        Self::with_status(StatusCode::OK, body)
    }

    pub fn empty() -> Self {
        Self::ok(&json!({}))
    }

    /// A handler failed. Status stays 200; the body says what went wrong.
    pub fn failure(err: &AppError) -> Self {
        Self::ok(&failure_body(err))
    }

    /// The request could not be read at all.
    pub fn bad_request(err: &AppError) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, &failure_body(err))
    }

    pub fn json_body(&self) -> serde_json::Result<Value> {
        serde_json::from_str(&self.body)
    }
}

fn failure_body(err: &AppError) -> Value {
    json!({
        "success": false,
        "error": err.kind(),
        "message": err.to_string(),
    })
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        let mut response = (status, self.body).into_response();
        let headers = response.headers_mut();
        for (name, value) in &self.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                headers.insert(name, value);
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_envelope_carries_permissive_cors() {
        let envelope = Envelope::empty();
        assert_eq!(envelope.status_code, 200);
        assert_eq!(envelope.headers["Access-Control-Allow-Origin"], "*");
        assert_eq!(envelope.headers["Access-Control-Allow-Headers"], "*");
        assert_eq!(envelope.headers["Access-Control-Allow-Methods"], "*");
        assert_eq!(envelope.json_body().unwrap(), json!({}));
    }

    #[test]
    fn failures_keep_status_200() {
        let envelope = Envelope::failure(&AppError::BadRequest("no id".into()));
        assert_eq!(envelope.status_code, 200);
        let body = envelope.json_body().unwrap();
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["error"], json!("bad_request"));
    }

    #[test]
    fn unreadable_request_is_400() {
        let envelope = Envelope::bad_request(&AppError::BadRequest("malformed".into()));
        assert_eq!(envelope.status_code, 400);
    }
}
