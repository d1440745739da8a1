use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use md5::{Digest, Md5};
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use crate::error::Result;

/// Content fingerprint of a statistics request payload: the 128-bit
/// digest of the exact serialized bytes, hex-encoded. Identical payloads
/// always collide; this is the single-flight key.
pub fn fingerprint(payload: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(payload);
    hex::encode(hasher.finalize())
}

struct Slot {
    value: Option<(serde_json::Value, Instant)>,
}

/// Content-addressed statistics cache with single-flight de-duplication.
///
/// Each fingerprint owns an async mutex slot. The lock holder is the
/// in-flight marker: concurrent misses for the same fingerprint queue on
/// the lock, and every waiter observes the value the holder stored. A
/// failed computation stores nothing and releases the lock, so waiters
/// retry in turn rather than hanging; never more than one computation
/// runs per fingerprint at a time. Dropping a caller mid-wait just drops
/// its queue position; the slot state stays consistent.
pub struct StatsCache {
    slots: DashMap<String, Arc<Mutex<Slot>>>,
}

impl Default for StatsCache {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsCache {
    pub fn new() -> Self {
        Self {
            slots: DashMap::new(),
        }
    }

    /// Return the cached value for this payload if fresh, otherwise run
    /// `compute`, cache its result for `ttl`, and return it. Failures are
    /// surfaced and never cached.
    pub async fn get_or_compute<F, Fut>(
        &self,
        payload: &[u8],
        ttl: Duration,
        compute: F,
    ) -> Result<serde_json::Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<serde_json::Value>>,
    {
        let key = fingerprint(payload);
        let slot = self
            .slots
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(Slot { value: None })))
            .clone();

        let mut guard = slot.lock().await;
        if let Some((value, expires_at)) = &guard.value {
            if Instant::now() < *expires_at {
                return Ok(value.clone());
            }
        }

        let value = compute().await?;
        guard.value = Some((value.clone(), Instant::now() + ttl));
        Ok(value)
    }

    /// Drop slots whose entries have expired. An explicit operation, not
    /// a background loop; in-flight slots and slots another caller still
    /// holds a reference to are left alone.
    pub fn evict_expired(&self) {
        let now = Instant::now();
        self.slots.retain(|_, slot| {
            // A caller may have cloned the slot out of the map without
            // locking it yet; removing it here would let a second
            // computation start for the same fingerprint.
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            match slot.try_lock() {
                Ok(guard) => match &guard.value {
                    Some((_, expires_at)) => *expires_at > now,
                    None => false,
                },
                // Locked means a computation is in flight; keep it.
                Err(_) => true,
            }
        });
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
