//! Undo log for tracking a transaction's applied changes.
//!
//! Writes go straight to the tables; the log remembers enough to put
//! every touched row back the way it was if the transaction rolls back.

use rowpool_core::{Row, RowId, Value};
use std::collections::HashMap;

use crate::error::{StoreError, StoreResult};
use crate::table::Table;

/// One applied change and what undoing it needs.
#[derive(Debug, Clone)]
pub enum UndoEntry {
    /// A row was inserted; undo removes it.
    Inserted { table: String, id: RowId },
    /// Columns were overwritten; undo restores the previous values.
    Updated {
        table: String,
        id: RowId,
        previous: Vec<(String, Option<Value>)>,
    },
    /// A row was deleted; undo puts it back.
    Deleted { table: String, row: Row },
}

/// Changes applied inside one open transaction, oldest first.
#[derive(Debug, Clone, Default)]
pub struct UndoLog {
    entries: Vec<UndoEntry>,
}

impl UndoLog {
    /// Create a new empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a change.
    pub fn record(&mut self, entry: UndoEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[UndoEntry] {
        &self.entries
    }

    /// Undo every recorded change, newest first.
    ///
    /// Keeps going past a failed step so one vanished row does not leave
    /// the rest of the transaction applied; the first failure is returned.
    pub fn rollback(self, tables: &mut HashMap<String, Table>) -> StoreResult<()> {
        let mut first_err = None;
        for entry in self.entries.into_iter().rev() {
            if let Err(e) = undo(entry, tables) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn undo(entry: UndoEntry, tables: &mut HashMap<String, Table>) -> StoreResult<()> {
    match entry {
        UndoEntry::Inserted { table, id } => {
            let t = tables
                .get_mut(&table)
                .ok_or_else(|| StoreError::unknown_table(&table))?;
            t.delete(id)
                .map(|_| ())
                .ok_or_else(|| StoreError::row_not_found(&table, id))
        }
        UndoEntry::Updated {
            table,
            id,
            previous,
        } => tables
            .get_mut(&table)
            .ok_or_else(|| StoreError::unknown_table(&table))?
            .revert(id, previous),
        UndoEntry::Deleted { table, row } => {
            tables
                .get_mut(&table)
                .ok_or_else(|| StoreError::unknown_table(&table))?
                .restore(row);
            Ok(())
        }
    }
}
