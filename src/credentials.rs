use std::str::FromStr;

use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use password_hash::rand_core::OsRng;
use subtle::ConstantTimeEq;

use crate::error::{AppError, AppResult};

/// Checks a supplied password against what is stored on the user record.
pub trait CredentialVerifier: Send + Sync + 'static {
    fn verify(&self, supplied: &str, stored: &str) -> AppResult<bool>;

    /// Value to persist for a new secret.
    fn prepare(&self, secret: &str) -> AppResult<String>;
}

/// Stored value is an opaque precomputed hash that clients send as-is.
/// Compared in constant time; a plain `==` leaks the matching prefix length.
#[derive(Debug, Default, Clone, Copy)]
pub struct StoredValueVerifier;

impl CredentialVerifier for StoredValueVerifier {
    fn verify(&self, supplied: &str, stored: &str) -> AppResult<bool> {
        Ok(constant_time_eq(supplied, stored))
    }

    fn prepare(&self, secret: &str) -> AppResult<String> {
        Ok(secret.to_string())
    }
}

/// Stored value is an Argon2 PHC string.
#[derive(Default, Clone)]
pub struct Argon2Verifier {
    argon2: Argon2<'static>,
}

impl CredentialVerifier for Argon2Verifier {
    fn verify(&self, supplied: &str, stored: &str) -> AppResult<bool> {
        let parsed_hash = match PasswordHash::new(stored) {
            Ok(hash) => hash,
            Err(err) => {
                tracing::warn!(error = %err, "stored credential is not a PHC string");
                return Ok(false);
            }
        };
        Ok(self
            .argon2
            .verify_password(supplied.as_bytes(), &parsed_hash)
            .is_ok())
    }

    fn prepare(&self, secret: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;
        Ok(hash.to_string())
    }
}

pub fn constant_time_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialScheme {
    #[default]
    Stored,
    Argon2,
}

impl CredentialScheme {
    pub fn verifier(self) -> std::sync::Arc<dyn CredentialVerifier> {
        match self {
            CredentialScheme::Stored => std::sync::Arc::new(StoredValueVerifier),
            CredentialScheme::Argon2 => std::sync::Arc::new(Argon2Verifier::default()),
        }
    }
}

impl FromStr for CredentialScheme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stored" => Ok(CredentialScheme::Stored),
            "argon2" => Ok(CredentialScheme::Argon2),
            other => Err(anyhow::anyhow!("unknown credential scheme `{other}`")),
        }
    }
}
