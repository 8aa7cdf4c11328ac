//! Item data model.

pub mod item;
pub mod keys;

pub use item::{Item, ItemCounts, ItemKey, SortDirection};
pub use keys::KeyAllocator;
