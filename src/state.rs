use std::sync::Arc;

use crate::{
    config::AppConfig,
    credentials::{CredentialVerifier, StoredValueVerifier},
    db::{create_pool, ensure_table},
    store::{MemoryStore, PgStore, RecordStore},
    token::TokenService,
};

/// Everything a handler may touch. Read-only once built.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub tokens: TokenService,
    pub credentials: Arc<dyn CredentialVerifier>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn RecordStore>,
        tokens: TokenService,
        credentials: Arc<dyn CredentialVerifier>,
    ) -> Self {
        Self {
            store,
            tokens,
            credentials,
        }
    }

    /// In-memory store with stored-value credentials.
    pub fn in_memory(secret: &[u8]) -> Self {
        Self::new(
            Arc::new(MemoryStore::new()),
            TokenService::new(secret),
            Arc::new(StoredValueVerifier),
        )
    }

    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn RecordStore> = match &config.database_url {
            Some(url) => {
                let pool = create_pool(url).await?;
                ensure_table(&pool, &config.table_name).await?;
                tracing::info!(table = %config.table_name, "using postgres store");
                Arc::new(PgStore::new(pool, config.table_name.clone())?)
            }
            None => {
                tracing::warn!("DATABASE_URL is not set, records live in memory only");
                Arc::new(MemoryStore::new())
            }
        };

        Ok(Self::new(
            store,
            TokenService::new(config.jwt_secret.as_bytes()),
            config.credential_scheme.verifier(),
        ))
    }
}
