//! Connection pool and scoped leases.

use parking_lot::{Condvar, Mutex};
use rowpool_core::ConnectionId;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::buffer::{UndoEntry, UndoLog};
use crate::error::{StoreError, StoreResult};

/// One datastore connection. At most one transaction is open on it.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    transaction: Option<UndoLog>,
}

impl Connection {
    fn new(id: ConnectionId) -> Self {
        Self {
            id,
            transaction: None,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Check if a transaction is open.
    pub fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    /// Open a transaction.
    pub fn begin(&mut self) -> StoreResult<()> {
        if self.transaction.is_some() {
            return Err(StoreError::TransactionActive);
        }
        self.transaction = Some(UndoLog::new());
        Ok(())
    }

    /// Close the transaction, keeping its changes.
    pub(crate) fn commit(&mut self) -> StoreResult<UndoLog> {
        self.transaction.take().ok_or(StoreError::NoActiveTransaction)
    }

    /// Close the transaction, handing back its log for undoing.
    pub(crate) fn take_transaction(&mut self) -> Option<UndoLog> {
        self.transaction.take()
    }

    /// Remember a change for rollback. Outside a transaction changes are final.
    pub(crate) fn record(&mut self, entry: UndoEntry) {
        if let Some(log) = self.transaction.as_mut() {
            log.record(entry);
        }
    }
}

/// A fixed set of connections handed out one lease at a time.
#[derive(Debug)]
pub struct ConnectionPool {
    size: usize,
    idle: Mutex<Vec<Connection>>,
    returned: Condvar,
    in_use: AtomicUsize,
    high_water: AtomicUsize,
}

impl ConnectionPool {
    /// Create a pool of `size` connections.
    pub fn new(size: usize) -> StoreResult<Self> {
        if size == 0 {
            return Err(StoreError::InvalidPoolSize);
        }
        let idle = (0..size)
            .rev()
            .map(|i| Connection::new(ConnectionId::new(i as u32)))
            .collect();
        Ok(Self {
            size,
            idle: Mutex::new(idle),
            returned: Condvar::new(),
            in_use: AtomicUsize::new(0),
            high_water: AtomicUsize::new(0),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Connections currently leased.
    pub fn in_use(&self) -> usize {
        self.in_use.load(Ordering::SeqCst)
    }

    /// Most connections ever leased at once.
    pub fn high_water(&self) -> usize {
        self.high_water.load(Ordering::SeqCst)
    }

    /// Take a connection, blocking until one is idle.
    pub(crate) fn checkout(&self) -> Connection {
        let mut idle = self.idle.lock();
        loop {
            if let Some(conn) = idle.pop() {
                let now = self.in_use.fetch_add(1, Ordering::SeqCst) + 1;
                self.high_water.fetch_max(now, Ordering::SeqCst);
                return conn;
            }
            self.returned.wait(&mut idle);
        }
    }

    /// Give a connection back and wake one waiter.
    pub(crate) fn checkin(&self, conn: Connection) {
        let mut idle = self.idle.lock();
        idle.push(conn);
        self.in_use.fetch_sub(1, Ordering::SeqCst);
        drop(idle);
        self.returned.notify_one();
    }
}

/// Exclusive use of one connection until dropped.
///
/// Dropping the lease always returns the connection, first handing any
/// still-open transaction to `on_release` so it can be rolled back.
pub struct ConnectionLease<'p> {
    pool: &'p ConnectionPool,
    conn: Option<Connection>,
    on_release: Box<dyn Fn(ConnectionId, UndoLog) + 'p>,
}

impl<'p> ConnectionLease<'p> {
    pub(crate) fn new(
        pool: &'p ConnectionPool,
        on_release: Box<dyn Fn(ConnectionId, UndoLog) + 'p>,
    ) -> Self {
        Self {
            pool,
            conn: Some(pool.checkout()),
            on_release,
        }
    }
}

impl Deref for ConnectionLease<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        // Only `drop` takes the connection out.
        self.conn.as_ref().unwrap_or_else(|| unreachable!("lease used after release"))
    }
}

impl DerefMut for ConnectionLease<'_> {
    fn deref_mut(&mut self) -> &mut Connection {
        self.conn.as_mut().unwrap_or_else(|| unreachable!("lease used after release"))
    }
}

impl Drop for ConnectionLease<'_> {
    fn drop(&mut self) {
        if let Some(mut conn) = self.conn.take() {
            if let Some(log) = conn.take_transaction() {
                (self.on_release)(conn.id(), log);
            }
            self.pool.checkin(conn);
        }
    }
}
