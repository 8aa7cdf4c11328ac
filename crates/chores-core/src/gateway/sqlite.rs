//! `SQLite`-backed gateway.
//!
//! The list is stored as a JSON array in a single `kv_store` row. rusqlite is
//! blocking, so every call hops onto the blocking pool.

use super::{Gateway, GatewayError};
use crate::db::{self, schema};
use crate::model::Item;
use anyhow::Result;
use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Gateway persisting the item list into a `SQLite` database file.
#[derive(Debug, Clone)]
pub struct SqliteGateway {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl SqliteGateway {
    /// Open (or create) the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = db::open_store(path)?;
        debug!(path = %path.display(), "opened sqlite gateway");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(path.to_path_buf()),
        })
    }

    /// A private in-memory database, mostly for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Arc::new(Mutex::new(db::open_in_memory()?)),
            path: None,
        })
    }

    /// Database file path, or `None` for in-memory gateways.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, GatewayError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, GatewayError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().map_err(|_| GatewayError::Poisoned)?;
            f(&guard)
        })
        .await?
    }
}

#[async_trait]
impl Gateway for SqliteGateway {
    async fn get(&self, key: &str) -> Result<Option<Vec<Item>>, GatewayError> {
        let owned_key = key.to_string();
        let raw: Option<String> = self
            .with_conn(move |conn| {
                conn.query_row(schema::SELECT_VALUE_SQL, params![owned_key], |row| {
                    row.get(0)
                })
                .optional()
                .map_err(GatewayError::from)
            })
            .await?;

        raw.map(|json| {
            serde_json::from_str(&json).map_err(|source| GatewayError::Decode {
                key: key.to_string(),
                source,
            })
        })
        .transpose()
    }

    async fn set(&self, key: &str, items: &[Item]) -> Result<(), GatewayError> {
        let json = serde_json::to_string(items).map_err(GatewayError::Encode)?;
        let owned_key = key.to_string();
        let updated_at_us = chrono::Utc::now().timestamp_micros();
        self.with_conn(move |conn| {
            conn.execute(
                schema::UPSERT_VALUE_SQL,
                params![owned_key, json, updated_at_us],
            )?;
            Ok(())
        })
        .await
    }
}
