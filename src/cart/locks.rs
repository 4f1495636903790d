//! Per-cart mutual exclusion.
//!
//! Each cart id maps to its own async mutex. Holding the guard serializes the
//! load → mutate → write cycle for that cart, so two concurrent mutations of
//! the same cart cannot overwrite each other. Carts with no waiter or holder
//! have no entry in the table.
//!
//! The exclusion is local to this process: it only prevents lost updates when
//! a single service instance writes to the store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Debug, Default)]
pub struct CartLocks {
    table: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

/// Exclusive access to one cart. Released on drop.
#[derive(Debug)]
pub struct CartGuard<'a> {
    locks: &'a CartLocks,
    cart_id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl CartLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other task holds `cart_id`, then takes it.
    pub async fn lock(&self, cart_id: &str) -> CartGuard<'_> {
        let mutex = {
            let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
            table.entry(cart_id.to_string()).or_default().clone()
        };
        let guard = mutex.lock_owned().await;
        CartGuard {
            locks: self,
            cart_id: cart_id.to_string(),
            guard: Some(guard),
        }
    }

    /// Number of carts currently locked or waited on.
    #[cfg(test)]
    fn len(&self) -> usize {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for CartGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut table = self
            .locks
            .table
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Only the table still references the mutex: nobody is waiting.
        if table
            .get(&self.cart_id)
            .is_some_and(|mutex| Arc::strong_count(mutex) == 1)
        {
            table.remove(&self.cart_id);
        }
    }
}
