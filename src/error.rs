use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Shared cache error: {0}")]
    SharedCache(#[from] redis::RedisError),

    #[error("Shared cache unavailable: {0}")]
    SharedCacheUnavailable(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Missing required config: {0}")]
    MissingConfig(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl DirError {
    /// Whether the error came from the shared cache tier rather than from
    /// the caller or the backing store.
    #[must_use]
    pub const fn is_shared_tier(&self) -> bool {
        matches!(self, Self::SharedCache(_) | Self::SharedCacheUnavailable(_))
    }

    /// Message safe to show to end users of a search or listing surface.
    #[must_use]
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid request",
            Self::NotFound(_) => "not found",
            Self::Conflict(_) => "already reviewed",
            _ => "internal error",
        }
    }
}

pub type Result<T> = std::result::Result<T, DirError>;
