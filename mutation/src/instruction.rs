//! Mutation instructions and transform-result coercion.

use rowpool_core::{Attributes, Value};
use std::fmt;

use crate::error::{MutationError, MutationResult};

/// A column map whose composite values have already been encoded.
///
/// Only [`crate::serialize`] builds one, so every value it holds is a
/// scalar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SerializedRow(Attributes);

impl SerializedRow {
    pub(crate) fn new(values: Attributes) -> Self {
        Self(values)
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Column names in sorted order.
    pub fn columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = self.0.keys().map(String::as_str).collect();
        columns.sort_unstable();
        columns
    }

    pub fn as_attributes(&self) -> &Attributes {
        &self.0
    }

    pub fn into_inner(self) -> Attributes {
        self.0
    }
}

/// One insert, update or delete against a single table.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationInstruction {
    /// Add a new row.
    Insert { table: String, values: SerializedRow },
    /// Overwrite columns of the row whose primary key equals `key`.
    Update {
        table: String,
        key: Value,
        values: SerializedRow,
    },
    /// Remove the row whose primary key equals `key`.
    Delete { table: String, key: Value },
}

impl MutationInstruction {
    /// Target table.
    pub fn table(&self) -> &str {
        match self {
            MutationInstruction::Insert { table, .. }
            | MutationInstruction::Update { table, .. }
            | MutationInstruction::Delete { table, .. } => table,
        }
    }

    /// Row key for updates and deletes.
    pub fn key(&self) -> Option<&Value> {
        match self {
            MutationInstruction::Insert { .. } => None,
            MutationInstruction::Update { key, .. } | MutationInstruction::Delete { key, .. } => {
                Some(key)
            }
        }
    }

    /// Column data for inserts and updates.
    pub fn values(&self) -> Option<&SerializedRow> {
        match self {
            MutationInstruction::Insert { values, .. }
            | MutationInstruction::Update { values, .. } => Some(values),
            MutationInstruction::Delete { .. } => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MutationInstruction::Insert { .. } => "insert",
            MutationInstruction::Update { .. } => "update",
            MutationInstruction::Delete { .. } => "delete",
        }
    }
}

/// Renders as SQL-like text for logs.
impl fmt::Display for MutationInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationInstruction::Insert { table, values } => {
                let columns = values.columns();
                write!(f, "INSERT INTO \"{}\" (", table)?;
                for (i, column) in columns.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "\"{}\"", column)?;
                }
                write!(f, ") VALUES (")?;
                for (i, column) in columns.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write_literal(f, values.get(column).unwrap_or(&Value::Null))?;
                }
                write!(f, ")")
            }
            MutationInstruction::Update { table, key, values } => {
                write!(f, "UPDATE \"{}\" SET ", table)?;
                for (i, column) in values.columns().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "\"{}\" = ", column)?;
                    write_literal(f, values.get(column).unwrap_or(&Value::Null))?;
                }
                write!(f, " WHERE \"{}\".\"id\" = ", table)?;
                write_literal(f, key)
            }
            MutationInstruction::Delete { table, key } => {
                write!(f, "DELETE FROM \"{}\" WHERE \"{}\".\"id\" = ", table, table)?;
                write_literal(f, key)
            }
        }
    }
}

fn write_literal(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::Null => write!(f, "NULL"),
        Value::Bool(true) => write!(f, "TRUE"),
        Value::Bool(false) => write!(f, "FALSE"),
        Value::Int(i) => write!(f, "{}", i),
        Value::Float(fl) => write!(f, "{}", fl),
        Value::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
        composite => write!(f, "'{}'", composite.to_string().replace('\'', "''")),
    }
}

/// Conversion of a transform's return value into instructions.
///
/// The coercion is explicit and total over the implementing types:
/// `()` and `None` yield nothing, a single instruction yields itself,
/// a `Vec` yields its members in order (absent members skipped), and an
/// `Err` fails the whole row.
pub trait IntoMutations {
    /// Append this value's instructions to `out`, in order.
    fn append_to(self, out: &mut Vec<MutationInstruction>) -> MutationResult<()>;

    /// Collect this value's instructions into a new list.
    fn into_mutations(self) -> MutationResult<Vec<MutationInstruction>>
    where
        Self: Sized,
    {
        let mut out = Vec::new();
        self.append_to(&mut out)?;
        Ok(out)
    }
}

impl IntoMutations for () {
    fn append_to(self, _out: &mut Vec<MutationInstruction>) -> MutationResult<()> {
        Ok(())
    }
}

impl IntoMutations for MutationInstruction {
    fn append_to(self, out: &mut Vec<MutationInstruction>) -> MutationResult<()> {
        out.push(self);
        Ok(())
    }
}

impl<T: IntoMutations> IntoMutations for Option<T> {
    fn append_to(self, out: &mut Vec<MutationInstruction>) -> MutationResult<()> {
        match self {
            Some(inner) => inner.append_to(out),
            None => Ok(()),
        }
    }
}

impl<T: IntoMutations> IntoMutations for Vec<T> {
    fn append_to(self, out: &mut Vec<MutationInstruction>) -> MutationResult<()> {
        for item in self {
            item.append_to(out)?;
        }
        Ok(())
    }
}

impl<T: IntoMutations> IntoMutations for Result<T, MutationError> {
    fn append_to(self, out: &mut Vec<MutationInstruction>) -> MutationResult<()> {
        self?.append_to(out)
    }
}
