//! Composite value encoding.
//!
//! Columns hold scalars. Before an insert or update is attached to an
//! instruction, every list- or map-shaped value is replaced by its encoded
//! string form; scalars pass through untouched.

use rowpool_core::{Attributes, Value};

use crate::error::{MutationError, MutationResult};
use crate::instruction::SerializedRow;

/// Encodes a composite value into a form a scalar column can store.
///
/// Closures of the shape `Fn(&Value) -> MutationResult<String>` implement
/// this trait, so an ad hoc encoder needs no named type.
pub trait Serializer: Send + Sync {
    /// Encode one composite value.
    fn dump(&self, value: &Value) -> MutationResult<String>;
}

impl<F> Serializer for F
where
    F: Fn(&Value) -> MutationResult<String> + Send + Sync,
{
    fn dump(&self, value: &Value) -> MutationResult<String> {
        self(value)
    }
}

/// The default encoder: compact JSON text.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl JsonSerializer {
    pub fn new() -> Self {
        Self
    }

    /// Decode text produced by [`Serializer::dump`] back into a value.
    pub fn load(&self, encoded: &str) -> MutationResult<Value> {
        serde_json::from_str(encoded).map_err(|e| MutationError::decode(e.to_string()))
    }
}

impl Serializer for JsonSerializer {
    /// Fails on NaN and infinities, which JSON has no spelling for.
    fn dump(&self, value: &Value) -> MutationResult<String> {
        ensure_finite(value)?;
        serde_json::to_string(value).map_err(|e| MutationError::encode(e.to_string()))
    }
}

fn ensure_finite(value: &Value) -> MutationResult<()> {
    match value {
        Value::Float(f) if !f.is_finite() => Err(MutationError::encode(format!(
            "non-finite float {} cannot be encoded as JSON",
            f
        ))),
        Value::List(items) => items.iter().try_for_each(ensure_finite),
        Value::Map(entries) => entries.values().try_for_each(ensure_finite),
        _ => Ok(()),
    }
}

/// Replace every composite value in `values` with its encoded form.
///
/// The output has exactly the keys of the input.
pub fn serialize(values: Attributes, serializer: &dyn Serializer) -> MutationResult<SerializedRow> {
    let mut out = Attributes::with_capacity(values.len());
    for (column, value) in values {
        let stored = if value.is_composite() {
            let encoded = serializer
                .dump(&value)
                .map_err(|e| MutationError::serialize(&column, e.to_string()))?;
            Value::String(encoded)
        } else {
            value
        };
        out.insert(column, stored);
    }
    Ok(SerializedRow::new(out))
}
