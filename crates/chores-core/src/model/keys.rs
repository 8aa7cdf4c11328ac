//! Monotonic key allocation.
//!
//! Keys are the larger of "one past the last key handed out" and the current
//! wall-clock time in milliseconds. Two items created within the same
//! millisecond still get distinct keys, and keys stay comparable with lists
//! written by clients that used raw timestamps.
//!
//! Once the counter reaches `u64::MAX` there is nothing left above it, so
//! allocation falls back to the lowest key not held by a live item.

use super::item::ItemKey;
use std::collections::HashSet;

/// Hands out strictly increasing [`ItemKey`]s.
#[derive(Debug, Clone, Default)]
pub struct KeyAllocator {
    last: Option<u64>,
}

impl KeyAllocator {
    #[must_use]
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Make sure future keys sort after every key in `existing`.
    pub fn observe<'a>(&mut self, existing: impl IntoIterator<Item = &'a ItemKey>) {
        if let Some(max) = existing.into_iter().map(|key| key.get()).max() {
            self.last = Some(self.last.map_or(max, |last| last.max(max)));
        }
    }

    /// Allocate the next key using the current wall clock.
    ///
    /// `live` is every key currently in the list; it is only read when the
    /// counter is exhausted.
    pub fn allocate<'a>(&mut self, live: impl IntoIterator<Item = &'a ItemKey>) -> ItemKey {
        self.allocate_at(now_ms(), live)
    }

    /// Allocate the next key as if the clock read `now_ms`.
    pub fn allocate_at<'a>(
        &mut self,
        now_ms: u64,
        live: impl IntoIterator<Item = &'a ItemKey>,
    ) -> ItemKey {
        let next = match self.last {
            None => Some(now_ms),
            Some(last) => last.checked_add(1).map(|next| next.max(now_ms)),
        };
        match next {
            Some(next) => {
                self.last = Some(next);
                ItemKey::new(next)
            }
            None => lowest_free(live),
        }
    }
}

fn lowest_free<'a>(live: impl IntoIterator<Item = &'a ItemKey>) -> ItemKey {
    let taken: HashSet<u64> = live.into_iter().map(|key| key.get()).collect();
    let free = (0..=u64::MAX)
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_default();
    ItemKey::new(free)
}

fn now_ms() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}
