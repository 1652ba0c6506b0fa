//! Identity types for stored rows and leased connections.
//!
//! Identifiers are 64-bit values that are unique within their table (rows)
//! or their pool (connections) and never reused.

use crate::Value;
use std::fmt;

/// Primary key of a stored row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(pub i64);

impl RowId {
    /// Create a new RowId from a raw value.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw value.
    pub fn raw(&self) -> i64 {
        self.0
    }

    /// Interpret a row key value as a RowId. Only integer keys qualify.
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_int().map(Self)
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<RowId> for Value {
    fn from(id: RowId) -> Self {
        Value::Int(id.0)
    }
}

/// Identifier for one connection of a connection pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub u32);

impl ConnectionId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn{}", self.0)
    }
}
