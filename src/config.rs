use std::env;

use crate::{credentials::CredentialScheme, token::DEV_FALLBACK_SECRET};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            _ => Environment::Development,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub jwt_secret: String,
    pub database_url: Option<String>,
    pub table_name: String,
    pub credential_scheme: CredentialScheme,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let environment = Environment::parse(env::var("APP_ENV").ok().as_deref());
        let jwt_secret = resolve_secret(environment, env::var("JWT_SECRET").ok())?;
        let database_url = env::var("DATABASE_URL").ok().filter(|u| !u.is_empty());
        let table_name = env::var("TABLE_NAME").unwrap_or_else(|_| "storefront".to_string());
        let credential_scheme = match env::var("CREDENTIAL_SCHEME") {
            Ok(value) => value.parse()?,
            Err(_) => CredentialScheme::default(),
        };
        Ok(Self {
            host,
            port,
            environment,
            jwt_secret,
            database_url,
            table_name,
            credential_scheme,
        })
    }
}

/// Production refuses to start without a secret; elsewhere the named
/// development fallback is used and announced.
pub fn resolve_secret(environment: Environment, secret: Option<String>) -> anyhow::Result<String> {
    match secret.filter(|s| !s.trim().is_empty()) {
        Some(secret) => Ok(secret),
        None if environment == Environment::Production => {
            anyhow::bail!("JWT_SECRET must be set when APP_ENV=production")
        }
        None => {
            tracing::warn!("JWT_SECRET is not set, signing tokens with DEV_FALLBACK_SECRET");
            Ok(DEV_FALLBACK_SECRET.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_without_secret_is_refused() {
        assert!(resolve_secret(Environment::Production, None).is_err());
        assert!(resolve_secret(Environment::Production, Some("  ".into())).is_err());
    }

    #[test]
    fn development_falls_back_to_named_secret() {
        let secret = resolve_secret(Environment::Development, None).unwrap();
        assert_eq!(secret, DEV_FALLBACK_SECRET);
    }

    #[test]
    fn configured_secret_wins() {
        let secret = resolve_secret(Environment::Production, Some("s3cret".into())).unwrap();
        assert_eq!(secret, "s3cret");
    }

    #[test]
    fn environment_parsing_defaults_to_development() {
        assert_eq!(Environment::parse(None), Environment::Development);
        assert_eq!(Environment::parse(Some("PRODUCTION")), Environment::Production);
        assert_eq!(Environment::parse(Some("staging")), Environment::Development);
    }
}
