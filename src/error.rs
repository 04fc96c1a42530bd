use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Token error")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Seeding failed for {failed} of {total} records")]
    Seed { failed: usize, total: usize },

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable identifier written into failure envelopes.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "bad_request",
            AppError::Store(StoreError::NotFound { .. }) => "not_found",
            AppError::Store(StoreError::KeyField(_)) => "bad_request",
            AppError::Store(_) => "store_error",
            AppError::Token(_) => "token_error",
            AppError::Seed { .. } => "seed_failed",
            AppError::Internal(_) => "internal",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
