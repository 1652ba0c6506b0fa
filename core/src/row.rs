//! Row structures.
//!
//! A [`Row`] is what a table stores; a [`WorkItem`] is the positional
//! projection of one source row that gets handed to a worker.

use crate::{Attributes, RowId, Value};
use std::ops::Deref;

/// A stored table row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Primary key.
    pub id: RowId,
    /// Column values (the `id` column is not repeated here).
    pub values: Attributes,
}

impl Row {
    /// Create a new row with the given id and values.
    pub fn new(id: RowId, values: Attributes) -> Self {
        Self { id, values }
    }

    /// Get a column value by name. `id` resolves to the primary key.
    pub fn get(&self, column: &str) -> Option<Value> {
        if column == "id" {
            return Some(self.id.into());
        }
        self.values.get(column).cloned()
    }

    /// Set a column value, returning the previous one.
    pub fn set(&mut self, column: String, value: Value) -> Option<Value> {
        self.values.insert(column, value)
    }

    /// Project the given columns in order. Missing columns read as null.
    pub fn project(&self, columns: &[String]) -> Vec<Value> {
        columns
            .iter()
            .map(|c| self.get(c).unwrap_or(Value::Null))
            .collect()
    }
}

/// One row's column values, in requested-column order.
///
/// Immutable once built; dereferences to a value slice so transforms can
/// index or pattern-match it positionally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkItem(Vec<Value>);

impl WorkItem {
    /// Wrap a positional tuple.
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    /// Get the values as a slice.
    pub fn values(&self) -> &[Value] {
        &self.0
    }

    /// Consume the item, returning its values.
    pub fn into_values(self) -> Vec<Value> {
        self.0
    }
}

impl Deref for WorkItem {
    type Target = [Value];

    fn deref(&self) -> &[Value] {
        &self.0
    }
}

impl From<Vec<Value>> for WorkItem {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl std::fmt::Display for WorkItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        write!(f, "]")
    }
}
