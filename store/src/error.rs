//! Store error types.

use rowpool_core::{ConnectionId, RowId};
use thiserror::Error;

/// Errors that can occur in the datastore.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Table not found.
    #[error("unknown table: {table}")]
    UnknownTable { table: String },

    /// Table already exists.
    #[error("table already exists: {table}")]
    DuplicateTable { table: String },

    /// Column not declared on the table.
    #[error("unknown column: {column} on table {table}")]
    UnknownColumn { table: String, column: String },

    /// A list or map reached a scalar column.
    #[error("column {column} on table {table} cannot store a {type_name} value")]
    CompositeValue {
        table: String,
        column: String,
        type_name: String,
    },

    /// Row key is not an integer.
    #[error("invalid row key for table {table}: {key}")]
    InvalidRowKey { table: String, key: String },

    /// Row vanished while undoing a change.
    #[error("row {id} not found in table {table}")]
    RowNotFound { table: String, id: RowId },

    /// A transaction is already open on this connection.
    #[error("transaction already active on connection")]
    TransactionActive,

    /// No transaction is open on this connection.
    #[error("no transaction is active on connection")]
    NoActiveTransaction,

    /// Another open transaction kept the row locked past the lock timeout.
    #[error("row {id} of table {table} is locked by {holder}")]
    WriteConflict {
        table: String,
        id: RowId,
        holder: ConnectionId,
    },

    /// Connection pool needs at least one connection.
    #[error("connection pool size must be positive")]
    InvalidPoolSize,
}

impl StoreError {
    pub fn unknown_table(table: impl Into<String>) -> Self {
        Self::UnknownTable {
            table: table.into(),
        }
    }

    pub fn duplicate_table(table: impl Into<String>) -> Self {
        Self::DuplicateTable {
            table: table.into(),
        }
    }

    pub fn unknown_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::UnknownColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    pub fn composite_value(
        table: impl Into<String>,
        column: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        Self::CompositeValue {
            table: table.into(),
            column: column.into(),
            type_name: type_name.into(),
        }
    }

    pub fn invalid_row_key(table: impl Into<String>, key: impl Into<String>) -> Self {
        Self::InvalidRowKey {
            table: table.into(),
            key: key.into(),
        }
    }

    pub fn write_conflict(table: impl Into<String>, id: RowId, holder: ConnectionId) -> Self {
        Self::WriteConflict {
            table: table.into(),
            id,
            holder,
        }
    }

    pub fn row_not_found(table: impl Into<String>, id: RowId) -> Self {
        Self::RowNotFound {
            table: table.into(),
            id,
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
