//! SQL for the key-value store database.

/// Version 1: the key-value table. The schema version lives in
/// `PRAGMA user_version`.
pub const MIGRATION_V1_SQL: &str = r"
CREATE TABLE IF NOT EXISTS kv_store (
    key           TEXT PRIMARY KEY NOT NULL,
    value         TEXT NOT NULL,
    updated_at_us INTEGER NOT NULL
);
";

pub const SELECT_VALUE_SQL: &str = "SELECT value FROM kv_store WHERE key = ?1";

pub const UPSERT_VALUE_SQL: &str = "INSERT INTO kv_store (key, value, updated_at_us)
     VALUES (?1, ?2, ?3)
     ON CONFLICT(key) DO UPDATE SET
         value = excluded.value,
         updated_at_us = excluded.updated_at_us";
