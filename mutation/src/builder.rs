//! Per-table instruction constructors.

use rowpool_core::{Attributes, Value};
use std::fmt;
use std::sync::Arc;

use crate::error::MutationResult;
use crate::instruction::MutationInstruction;
use crate::serializer::{serialize, Serializer};

/// Builds instructions for one table.
///
/// Insert and update column maps go through the configured serializer
/// before they are attached; delete carries only the row key.
#[derive(Clone)]
pub struct MutationBuilder {
    table: String,
    serializer: Arc<dyn Serializer>,
}

impl MutationBuilder {
    /// Create a builder for `table` using `serializer` for composite values.
    pub fn new(table: impl Into<String>, serializer: Arc<dyn Serializer>) -> Self {
        Self {
            table: table.into(),
            serializer,
        }
    }

    /// The table every built instruction targets.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Build an insert of a new row.
    pub fn insert(&self, values: Attributes) -> MutationResult<MutationInstruction> {
        Ok(MutationInstruction::Insert {
            table: self.table.clone(),
            values: serialize(values, self.serializer.as_ref())?,
        })
    }

    /// Build an update of the row whose key equals `key`.
    pub fn update(
        &self,
        key: impl Into<Value>,
        values: Attributes,
    ) -> MutationResult<MutationInstruction> {
        Ok(MutationInstruction::Update {
            table: self.table.clone(),
            key: key.into(),
            values: serialize(values, self.serializer.as_ref())?,
        })
    }

    /// Build a delete of the row whose key equals `key`.
    pub fn delete(&self, key: impl Into<Value>) -> MutationInstruction {
        MutationInstruction::Delete {
            table: self.table.clone(),
            key: key.into(),
        }
    }
}

impl fmt::Debug for MutationBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutationBuilder")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}
