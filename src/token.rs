use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};

/// Signing secret used when `JWT_SECRET` is unset outside production.
/// Anything signed with it must be treated as forgeable.
pub const DEV_FALLBACK_SECRET: &str = "storefront-gateway-insecure-dev-secret";

pub const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub data: Map<String, Value>,
    pub iat: i64,
    pub exp: i64,
}

/// Identity resolved from a bearer token. Empty means anonymous.
///
/// A valid token carrying an empty payload also resolves to anonymous, so a
/// user record with no profile `info` cannot be told apart from no token.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Identity(pub Map<String, Value>);

impl Identity {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_anonymous(&self) -> bool {
        self.0.is_empty()
    }

    pub fn payload(&self) -> &Map<String, Value> {
        &self.0
    }
}

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn issue(&self, payload: Map<String, Value>) -> AppResult<String> {
        self.issue_at(payload, Utc::now())
    }

    pub fn issue_at(&self, payload: Map<String, Value>, issued_at: DateTime<Utc>) -> AppResult<String> {
        let expiration = issued_at
            .checked_add_signed(Duration::hours(TOKEN_TTL_HOURS))
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

        let claims = Claims {
            data: payload,
            iat: issued_at.timestamp(),
            exp: expiration.timestamp(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Never fails: anything short of a valid, unexpired token is anonymous.
    pub fn verify(&self, token: Option<&str>) -> Identity {
        let Some(raw) = token else {
            return Identity::anonymous();
        };
        let raw = raw.trim();
        let raw = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();
        if raw.is_empty() {
            return Identity::anonymous();
        }

        let claims = match decode::<Claims>(raw, &self.decoding, &self.validation) {
            Ok(decoded) => decoded.claims,
            Err(err) => {
                tracing::debug!(error = %err, "token rejected");
                return Identity::anonymous();
            }
        };

        if claims.exp <= Utc::now().timestamp() {
            tracing::debug!(exp = claims.exp, "token expired");
            return Identity::anonymous();
        }

        Identity(claims.data)
    }
}
