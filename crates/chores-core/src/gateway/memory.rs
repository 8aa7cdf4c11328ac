//! In-process gateway with failure injection.

use super::{Gateway, GatewayError};
use crate::model::Item;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Gateway backed by a `HashMap`, for embedding and tests.
///
/// Reads and writes can be switched to fail on demand to exercise the
/// store's swallow-and-log paths.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    slots: Mutex<HashMap<String, Vec<Item>>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway whose `key` slot already holds `items`.
    #[must_use]
    pub fn with_items(key: &str, items: Vec<Item>) -> Self {
        let gateway = Self::new();
        if let Ok(mut slots) = gateway.slots.lock() {
            slots.insert(key.to_string(), items);
        }
        gateway
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `set` calls so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Current contents of `key`, bypassing failure injection.
    #[must_use]
    pub fn stored(&self, key: &str) -> Option<Vec<Item>> {
        self.slots.lock().ok()?.get(key).cloned()
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn get(&self, key: &str) -> Result<Option<Vec<Item>>, GatewayError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(GatewayError::Unavailable("injected read failure".to_string()));
        }
        let slots = self.slots.lock().map_err(|_| GatewayError::Poisoned)?;
        Ok(slots.get(key).cloned())
    }

    async fn set(&self, key: &str, items: &[Item]) -> Result<(), GatewayError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(GatewayError::Unavailable("injected write failure".to_string()));
        }
        let mut slots = self.slots.lock().map_err(|_| GatewayError::Poisoned)?;
        slots.insert(key.to_string(), items.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemKey;

    #[tokio::test]
    async fn round_trips_a_slot() {
        let gateway = MemoryGateway::new();
        assert!(gateway.get("TODO_LIST").await.expect("get").is_none());

        let items = vec![Item::new(ItemKey::new(1), "water plants")];
        gateway.set("TODO_LIST", &items).await.expect("set");

        assert_eq!(gateway.get("TODO_LIST").await.expect("get"), Some(items));
        assert_eq!(gateway.write_count(), 1);
    }

    #[tokio::test]
    async fn injected_failures_surface_as_unavailable() {
        let gateway = MemoryGateway::with_items("k", vec![Item::new(ItemKey::new(1), "a")]);
        gateway.fail_reads(true);
        gateway.fail_writes(true);

        let read = gateway.get("k").await;
        assert!(matches!(read, Err(GatewayError::Unavailable(_))));
        let write = gateway.set("k", &[]).await;
        assert!(matches!(write, Err(GatewayError::Unavailable(_))));

        assert_eq!(gateway.write_count(), 0);
        assert_eq!(gateway.stored("k").map(|items| items.len()), Some(1));
    }
}
