//! Per-user mutual exclusion.
//!
//! Cart mutation and checkout for one user run strictly one at a time; different
//! users get different locks and never contend beyond the brief registry lookup.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use storefront_core::UserId;

#[derive(Debug, Default)]
pub struct UserLocks {
    registry: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding `user_id`'s lock. Poisoning is ignored (the guarded
    /// data is `()`).
    pub fn with_user<T>(&self, user_id: UserId, f: impl FnOnce() -> T) -> T {
        let lock = {
            let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
            registry.entry(user_id).or_default().clone()
        };

        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };

        self.release(user_id, lock);
        result
    }

    /// Number of users with a live lock entry.
    pub fn tracked_users(&self) -> usize {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    // Drop the registry entry once nobody else holds or waits on it.
    fn release(&self, user_id: UserId, lock: Arc<Mutex<()>>) {
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the registry, one in `lock`.
        if Arc::strong_count(&lock) == 2 {
            registry.remove(&user_id);
        }
    }
}
