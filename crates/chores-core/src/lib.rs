//! chores-core library.
//!
//! An ordered to-do list held in memory by [`ItemStore`] and mirrored into a
//! [`Gateway`] after every mutation.

pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod lock;
pub mod model;
pub mod query;
pub mod store;
pub mod writer;

/// # Conventions
///
/// - **Errors**: `thiserror` enums at the storage seam, `anyhow::Result` for
///   configuration and database setup. Store mutations never return errors.
/// - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).
pub use error::ErrorCode;
pub use gateway::{DEFAULT_STORAGE_KEY, Gateway, GatewayError, MemoryGateway, SqliteGateway};
pub use lock::{LockError, LockMode, SessionLock};
pub use model::{Item, ItemCounts, ItemKey, SortDirection};
pub use query::ItemQuery;
pub use store::ItemStore;
pub use writer::WriteReport;
