use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockMap = HashMap<String, Arc<AsyncMutex<()>>>;

/// Per-load-balancer async locks.
///
/// Serializes read-modify-write cycles on the same load balancer inside one
/// process. Writers in other processes are not covered. An entry lives only
/// while some caller holds or waits for it.
#[derive(Debug, Default)]
pub(crate) struct LbLocks {
    inner: Mutex<LockMap>,
}

/// Held lock on one load balancer; releases and evicts on drop.
pub(crate) struct LbGuard<'a> {
    locks: &'a LbLocks,
    lb_id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl LbLocks {
    fn map(&self) -> MutexGuard<'_, LockMap> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) async fn acquire(&self, lb_id: &str) -> LbGuard<'_> {
        let lock = self.map().entry(lb_id.to_string()).or_default().clone();
        LbGuard {
            locks: self,
            lb_id: lb_id.to_string(),
            guard: Some(lock.lock_owned().await),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.map().len()
    }
}

impl Drop for LbGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut map = self.locks.map();
        // Only the map's own reference left: nobody holds or awaits this lock.
        if map.get(&self.lb_id).is_some_and(|l| Arc::strong_count(l) == 1) {
            map.remove(&self.lb_id);
        }
    }
}
