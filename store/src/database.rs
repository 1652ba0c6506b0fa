//! In-memory database: named tables behind one lock, plus a connection pool.
//!
//! Writes are applied to the tables as soon as they execute and logged on
//! the connection's open transaction. Other connections see them right
//! away (read uncommitted); rollback replays the log backwards. A row
//! written inside a transaction stays locked to that connection until it
//! commits or rolls back, so a rollback only ever restores its own writes.

use parking_lot::RwLock;
use rowpool_core::{Attributes, ConnectionId, Row, RowId, Value};
use rowpool_mutation::MutationInstruction;
use std::collections::HashMap;
use std::time::Duration;

use crate::buffer::{UndoEntry, UndoLog};
use crate::connection::{Connection, ConnectionLease, ConnectionPool};
use crate::error::{StoreError, StoreResult};
use crate::lock::{RowLocks, DEFAULT_LOCK_TIMEOUT};
use crate::query::{Scope, SelectQuery};
use crate::table::Table;

/// Connections per database unless configured otherwise.
pub const DEFAULT_POOL_SIZE: usize = 5;

/// A set of in-memory tables shared by every leased connection.
#[derive(Debug)]
pub struct MemoryDatabase {
    tables: RwLock<HashMap<String, Table>>,
    pool: ConnectionPool,
    locks: RowLocks,
}

impl MemoryDatabase {
    /// Create an empty database with `pool_size` connections.
    pub fn new(pool_size: usize) -> StoreResult<Self> {
        Ok(Self {
            tables: RwLock::new(HashMap::new()),
            pool: ConnectionPool::new(pool_size)?,
            locks: RowLocks::new(DEFAULT_LOCK_TIMEOUT),
        })
    }

    /// Wait at most `timeout` for a row another transaction has locked.
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.locks = RowLocks::new(timeout);
        self
    }

    /// The connection pool.
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    // ========== Schema ==========

    /// Create a table with the given columns (`id` is implicit).
    pub fn create_table<I, S>(&self, name: &str, columns: I) -> StoreResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tables = self.tables.write();
        if tables.contains_key(name) {
            return Err(StoreError::duplicate_table(name));
        }
        tables.insert(name.to_string(), Table::new(name, columns));
        Ok(())
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.read().contains_key(name)
    }

    // ========== Direct Access ==========

    /// Insert a row outside any transaction.
    pub fn insert(&self, table: &str, values: Attributes) -> StoreResult<RowId> {
        let mut tables = self.tables.write();
        table_mut(&mut tables, table)?.insert(values)
    }

    /// Count rows of `table` in `scope`.
    pub fn count(&self, table: &str, scope: &Scope) -> StoreResult<usize> {
        let tables = self.tables.read();
        Ok(table_ref(&tables, table)?.count(scope))
    }

    /// Snapshot of the row with key `id`.
    pub fn get(&self, table: &str, id: RowId) -> StoreResult<Option<Row>> {
        let tables = self.tables.read();
        Ok(table_ref(&tables, table)?.get(id).cloned())
    }

    /// Project `columns` of every row of `table` in `scope`.
    pub fn project(
        &self,
        table: &str,
        scope: &Scope,
        columns: &[String],
        limit: Option<usize>,
    ) -> StoreResult<Vec<Vec<Value>>> {
        let tables = self.tables.read();
        table_ref(&tables, table)?.project(scope, columns, limit)
    }

    /// Run a select query, yielding rows in its projection order.
    pub fn select(&self, query: &SelectQuery) -> StoreResult<Vec<Vec<Value>>> {
        self.project(&query.table, &query.scope, &query.projection, query.limit)
    }

    // ========== Connections ==========

    /// Lease a connection, blocking while all are in use.
    ///
    /// A transaction still open when the lease drops is rolled back.
    pub fn lease(&self) -> ConnectionLease<'_> {
        ConnectionLease::new(
            &self.pool,
            Box::new(move |owner: ConnectionId, log: UndoLog| {
                let undone = self.undo(log);
                self.locks.release_all(owner);
                if let Err(e) = undone {
                    tracing::warn!(connection = %owner, error = %e, "rollback on lease release was incomplete");
                }
            }),
        )
    }

    /// Commit the connection's open transaction and release its row locks.
    pub fn commit(&self, conn: &mut Connection) -> StoreResult<UndoLog> {
        let log = conn.commit()?;
        self.locks.release_all(conn.id());
        Ok(log)
    }

    /// Roll back the connection's open transaction and release its row locks.
    pub fn rollback(&self, conn: &mut Connection) -> StoreResult<()> {
        let log = conn.take_transaction().ok_or(StoreError::NoActiveTransaction)?;
        tracing::debug!(connection = %conn.id(), changes = log.len(), "rolling back transaction");
        let undone = self.undo(log);
        self.locks.release_all(conn.id());
        undone
    }

    fn undo(&self, log: UndoLog) -> StoreResult<()> {
        if log.is_empty() {
            return Ok(());
        }
        let mut tables = self.tables.write();
        log.rollback(&mut tables)
    }

    // ========== Execution ==========

    /// Apply one instruction, returning the number of rows affected.
    ///
    /// An update or delete whose key matches no row affects 0 rows. The
    /// touched row is locked first, waiting on any other open transaction
    /// that holds it; outside a transaction the lock is dropped right away.
    pub fn execute(
        &self,
        conn: &mut Connection,
        instruction: &MutationInstruction,
    ) -> StoreResult<usize> {
        let target = match instruction {
            MutationInstruction::Insert { .. } => None,
            MutationInstruction::Update { key, .. } | MutationInstruction::Delete { key, .. } => {
                Some(row_key(instruction.table(), key)?)
            }
        };
        if let Some(id) = target {
            self.locks.acquire(conn.id(), instruction.table(), id)?;
        }

        let applied = self.apply(conn, instruction, target);
        if !conn.in_transaction() {
            self.locks.release_all(conn.id());
        }
        let affected = applied?;

        tracing::debug!(connection = %conn.id(), affected, "{}", instruction);
        Ok(affected)
    }

    fn apply(
        &self,
        conn: &mut Connection,
        instruction: &MutationInstruction,
        target: Option<RowId>,
    ) -> StoreResult<usize> {
        let mut tables = self.tables.write();
        let table = table_mut(&mut tables, instruction.table())?;
        let name = table.name().to_string();

        let affected = match (instruction, target) {
            (MutationInstruction::Insert { values, .. }, _) => {
                let id = table.insert(values.as_attributes().clone())?;
                // A fresh key has no other holder, so this never waits.
                self.locks.acquire(conn.id(), &name, id)?;
                conn.record(UndoEntry::Inserted { table: name, id });
                1
            }
            (MutationInstruction::Update { values, .. }, Some(id)) => {
                match table.update(id, values.as_attributes())? {
                    Some(previous) => {
                        conn.record(UndoEntry::Updated {
                            table: name,
                            id,
                            previous,
                        });
                        1
                    }
                    None => 0,
                }
            }
            (MutationInstruction::Delete { .. }, Some(id)) => match table.delete(id) {
                Some(row) => {
                    conn.record(UndoEntry::Deleted { table: name, row });
                    1
                }
                None => 0,
            },
            (_, None) => 0,
        };
        Ok(affected)
    }
}

fn table_ref<'t>(tables: &'t HashMap<String, Table>, name: &str) -> StoreResult<&'t Table> {
    tables.get(name).ok_or_else(|| StoreError::unknown_table(name))
}

fn table_mut<'t>(
    tables: &'t mut HashMap<String, Table>,
    name: &str,
) -> StoreResult<&'t mut Table> {
    tables.get_mut(name).ok_or_else(|| StoreError::unknown_table(name))
}

fn row_key(table: &str, key: &Value) -> StoreResult<RowId> {
    RowId::from_value(key).ok_or_else(|| StoreError::invalid_row_key(table, key.to_string()))
}
