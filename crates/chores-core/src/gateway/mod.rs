//! Persistence gateway: the asynchronous key-value slot the item list is
//! mirrored into.
//!
//! The store reads the slot once at startup and overwrites it with the full
//! list after every mutation. Implementations only need last-write-wins
//! semantics for a single key; they never see partial updates.

pub mod memory;
pub mod sqlite;

use crate::error::ErrorCode;
use crate::model::Item;
use async_trait::async_trait;
use std::fmt;

pub use memory::MemoryGateway;
pub use sqlite::SqliteGateway;

/// Key the item list is stored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "TODO_LIST";

/// Errors reported by gateway implementations.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("stored list under {key:?} is not valid JSON: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode item list: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("storage connection mutex poisoned")]
    Poisoned,

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl GatewayError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Sqlite(_) | Self::Io(_) => ErrorCode::StorageWriteFailed,
            Self::Decode { .. } => ErrorCode::CorruptStore,
            Self::Encode(_) | Self::Join(_) | Self::Poisoned => ErrorCode::InternalUnexpected,
            Self::Unavailable(_) => ErrorCode::StorageUnavailable,
        }
    }
}

/// Asynchronous single-slot storage for the item list.
#[async_trait]
pub trait Gateway: Send + Sync + 'static {
    /// Return the list stored under `key`, or `None` if nothing was stored.
    async fn get(&self, key: &str) -> Result<Option<Vec<Item>>, GatewayError>;

    /// Overwrite the list stored under `key`.
    async fn set(&self, key: &str, items: &[Item]) -> Result<(), GatewayError>;
}

impl fmt::Debug for dyn Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dyn Gateway")
    }
}
