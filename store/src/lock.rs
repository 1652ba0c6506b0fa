//! Row write locks.
//!
//! A transaction that writes a row owns it until commit or rollback. Other
//! writers wait for it, and give up with a conflict once the lock timeout
//! passes. Rollback can therefore never overwrite a value another
//! connection has committed.

use parking_lot::{Condvar, Mutex};
use rowpool_core::{ConnectionId, RowId};
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::error::{StoreError, StoreResult};

/// How long a writer waits on a row held by another transaction.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

type RowKey = (String, RowId);

#[derive(Debug)]
pub(crate) struct RowLocks {
    owners: Mutex<HashMap<RowKey, ConnectionId>>,
    released: Condvar,
    timeout: Duration,
}

impl RowLocks {
    pub(crate) fn new(timeout: Duration) -> Self {
        Self {
            owners: Mutex::new(HashMap::new()),
            released: Condvar::new(),
            timeout,
        }
    }

    /// Take the lock on `table`/`id` for `owner`, waiting while another
    /// connection holds it. Re-acquiring an owned lock is a no-op.
    pub(crate) fn acquire(&self, owner: ConnectionId, table: &str, id: RowId) -> StoreResult<()> {
        let key = (table.to_string(), id);
        let deadline = Instant::now() + self.timeout;
        let mut owners = self.owners.lock();
        loop {
            match owners.get(&key) {
                None => {
                    owners.insert(key, owner);
                    return Ok(());
                }
                Some(holder) if *holder == owner => return Ok(()),
                Some(_) => {}
            }
            if self.released.wait_until(&mut owners, deadline).timed_out() {
                if let Some(holder) = owners.get(&key).filter(|h| **h != owner) {
                    return Err(StoreError::write_conflict(table, id, *holder));
                }
            }
        }
    }

    /// Drop every lock `owner` holds and wake waiting writers.
    pub(crate) fn release_all(&self, owner: ConnectionId) {
        let mut owners = self.owners.lock();
        let before = owners.len();
        owners.retain(|_, holder| *holder != owner);
        let freed = before - owners.len();
        drop(owners);
        if freed > 0 {
            self.released.notify_all();
        }
    }

    #[cfg(test)]
    pub(crate) fn held_by(&self, owner: ConnectionId) -> usize {
        self.owners.lock().values().filter(|h| **h == owner).count()
    }
}
