//! Per-key debouncing with stale-result suppression.
//!
//! Each trigger takes a [`Ticket`] for its key, which supersedes every
//! earlier ticket for that key. A task waits out the quiet period, then runs
//! only if its ticket is still current, and checks again before publishing
//! so results of superseded runs are dropped.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Proof of a trigger; compare with [`Debouncer::is_current`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

pub struct Debouncer<K> {
    current: Mutex<HashMap<K, u64>>,
    // Global so a ticket issued after `cancel` never equals an old one.
    counter: AtomicU64,
}

impl<K: Eq + Hash + Clone> Default for Debouncer<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone> Debouncer<K> {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(HashMap::new()),
            counter: AtomicU64::new(0),
        }
    }

    /// Issue a ticket for `key`, superseding any outstanding one.
    pub fn ticket(&self, key: &K) -> Ticket {
        let id = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        self.lock().insert(key.clone(), id);
        Ticket(id)
    }

    pub fn is_current(&self, key: &K, ticket: Ticket) -> bool {
        self.lock().get(key) == Some(&ticket.0)
    }

    /// Invalidate every outstanding ticket for `key`.
    pub fn cancel(&self, key: &K) {
        self.lock().remove(key);
    }

    /// Sleep for `delay`, then report whether `ticket` survived it.
    pub async fn settle(&self, key: &K, ticket: Ticket, delay: Duration) -> bool {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.is_current(key, ticket)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<K, u64>> {
        // The map holds plain integers, so a poisoned lock is still usable.
        self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}
