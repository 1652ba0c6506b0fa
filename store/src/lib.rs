//! rowpool Store
//!
//! The datastore capability set the pool runs against, plus an in-memory
//! implementation of it.
//!
//! Responsibilities:
//! - Lease connections from a fixed-size pool, releasing on every exit path
//! - Scope transactions: commit on success, roll back on error
//! - Execute one built instruction against a table
//! - Answer projections for model-scope and select-query sources

mod buffer;
mod connection;
mod database;
mod error;
mod lock;
mod model;
mod query;
mod table;

pub use buffer::{UndoEntry, UndoLog};
pub use connection::{Connection, ConnectionLease, ConnectionPool};
pub use database::{MemoryDatabase, DEFAULT_POOL_SIZE};
pub use error::{StoreError, StoreResult};
pub use lock::DEFAULT_LOCK_TIMEOUT;
pub use model::{Model, TableModel};
pub use query::{Filter, Scope, SelectQuery};
pub use table::Table;
