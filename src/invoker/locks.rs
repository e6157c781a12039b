//! # Exclusivity Locks
//!
//! Named async mutexes. Invocations holding the same key never run their
//! call concurrently; the guard is released when dropped, on every exit path.
//! A key's entry is removed once no holder or waiter references it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Registry = Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>;

fn lock_registry(
    registry: &Registry,
) -> std::sync::MutexGuard<'_, HashMap<String, Arc<AsyncMutex<()>>>> {
    registry
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Held for the duration of one exclusive invocation
#[derive(Debug)]
pub struct ExclusivityGuard {
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
    registry: Registry,
}

impl Drop for ExclusivityGuard {
    fn drop(&mut self) {
        // Release first so the entry's only remaining owners are the map
        // and any waiters
        drop(self.guard.take());

        let mut locks = lock_registry(&self.registry);
        let unused = locks
            .get(&self.key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1);
        if unused {
            locks.remove(&self.key);
        }
    }
}

/// Registry of per-key async mutexes. Keys are caller-supplied and
/// opaque.
#[derive(Debug, Default)]
pub struct ExclusivityLocks {
    locks: Registry,
}

impl ExclusivityLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other holder of `key` is running, then hold it
    pub async fn acquire(&self, key: &str) -> ExclusivityGuard {
        // Cloned under the registry lock, so a concurrent release sees this
        // waiter in the strong count and keeps the entry
        let lock = lock_registry(&self.locks)
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone();

        ExclusivityGuard {
            key: key.to_string(),
            guard: Some(lock.lock_owned().await),
            registry: self.locks.clone(),
        }
    }

    /// Number of keys currently held or waited on
    pub fn len(&self) -> usize {
        lock_registry(&self.locks).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
