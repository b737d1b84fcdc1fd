// libs/appointment-cell/src/services/locks.rs
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// One async mutex per key. Holding the guard serializes every caller using the same id.
///
/// Used per doctor around the slot check and insert, and per appointment around
/// read-guard-save in the lifecycle controller. Scope is a single process.
#[derive(Default)]
pub struct KeyedLocks {
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, key: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(locks.entry(key).or_default())
        };
        lock.lock_owned().await
    }
}
