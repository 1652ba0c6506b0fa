//! The capability set a pool needs from its datastore.

use rowpool_core::Value;
use rowpool_mutation::MutationInstruction;
use std::sync::Arc;

use crate::connection::Connection;
use crate::database::MemoryDatabase;
use crate::error::{StoreError, StoreResult};
use crate::query::{Scope, SelectQuery};

/// A table-bound handle on a datastore.
///
/// Workers share one model across threads, so implementations must be
/// `Sync`. Connections are only ever touched by the thread that leased
/// them.
pub trait Model: Sync {
    /// A leased connection.
    type Connection;

    /// Table that built instructions target.
    fn table_name(&self) -> &str;

    /// Project `columns` of this model's rows in `scope`.
    fn pluck(&self, scope: &Scope, columns: &[String]) -> StoreResult<Vec<Vec<Value>>>;

    /// Run a structured query, yielding rows in its projection order.
    fn select(&self, query: &SelectQuery) -> StoreResult<Vec<Vec<Value>>>;

    /// Lease a connection, run `scope` with it, and release it on every exit path.
    fn with_connection<T, E, F>(&self, scope: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self::Connection) -> Result<T, E>,
        E: From<StoreError>;

    /// Run `scope` in a transaction: commit on `Ok`, roll back on `Err`.
    fn transaction<T, E, F>(&self, conn: &mut Self::Connection, scope: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self::Connection) -> Result<T, E>,
        E: From<StoreError>;

    /// Apply one built instruction, returning the rows affected.
    fn execute(
        &self,
        conn: &mut Self::Connection,
        instruction: &MutationInstruction,
    ) -> StoreResult<usize>;
}

/// [`Model`] over one table of a [`MemoryDatabase`].
#[derive(Debug, Clone)]
pub struct TableModel {
    db: Arc<MemoryDatabase>,
    table: String,
}

impl TableModel {
    /// Bind to `table`, which must already exist.
    pub fn new(db: Arc<MemoryDatabase>, table: impl Into<String>) -> StoreResult<Self> {
        let table = table.into();
        if !db.has_table(&table) {
            return Err(StoreError::unknown_table(table));
        }
        Ok(Self { db, table })
    }

    pub fn database(&self) -> &Arc<MemoryDatabase> {
        &self.db
    }

    /// Count this table's rows in `scope`.
    pub fn count(&self, scope: &Scope) -> StoreResult<usize> {
        self.db.count(&self.table, scope)
    }
}

impl Model for TableModel {
    type Connection = Connection;

    fn table_name(&self) -> &str {
        &self.table
    }

    fn pluck(&self, scope: &Scope, columns: &[String]) -> StoreResult<Vec<Vec<Value>>> {
        self.db.project(&self.table, scope, columns, None)
    }

    fn select(&self, query: &SelectQuery) -> StoreResult<Vec<Vec<Value>>> {
        self.db.select(query)
    }

    fn with_connection<T, E, F>(&self, scope: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self::Connection) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut lease = self.db.lease();
        scope(&mut *lease)
    }

    fn transaction<T, E, F>(&self, conn: &mut Self::Connection, scope: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self::Connection) -> Result<T, E>,
        E: From<StoreError>,
    {
        conn.begin()?;
        match scope(conn) {
            Ok(value) => {
                let log = self.db.commit(conn)?;
                tracing::debug!(connection = %conn.id(), changes = log.len(), "committed transaction");
                Ok(value)
            }
            Err(e) => {
                if let Err(undo) = self.db.rollback(conn) {
                    tracing::warn!(connection = %conn.id(), error = %undo, "rollback failed");
                }
                Err(e)
            }
        }
    }

    fn execute(
        &self,
        conn: &mut Self::Connection,
        instruction: &MutationInstruction,
    ) -> StoreResult<usize> {
        self.db.execute(conn, instruction)
    }
}
