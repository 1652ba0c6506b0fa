//! Input normalization: every accepted source shape becomes a list of
//! positional work items.

use rowpool_core::{Attributes, Value, WorkItem};
use rowpool_store::{Model, Scope, SelectQuery};

use crate::error::{PoolError, PoolResult};

/// Shapes a source may take, as listed in errors.
pub const ACCEPTED_SOURCES: &str = "model scope, select query, list of records, list of tuples";

/// A key-value record.
pub type Record = Attributes;

/// Where a pool's rows come from.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// Rows of the pool's own model in this scope, projected to the requested columns.
    Model(Scope),
    /// A query that has not run yet. Rows come back in its projection order.
    Query(SelectQuery),
    /// Records; each contributes its values for the requested keys, in order.
    Records(Vec<Record>),
    /// Positional tuples, used as-is.
    Tuples(Vec<Vec<Value>>),
}

impl Source {
    /// Every row of the pool's model.
    pub fn model() -> Self {
        Source::Model(Scope::all())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Source::Model(_) => "model scope",
            Source::Query(_) => "select query",
            Source::Records(_) => "list of records",
            Source::Tuples(_) => "list of tuples",
        }
    }

    /// Resolve this source into work items for `columns`.
    pub fn normalize<M: Model>(self, model: &M, columns: &[String]) -> PoolResult<Vec<WorkItem>> {
        let rows = match self {
            Source::Model(scope) => model.pluck(&scope, columns)?,
            Source::Query(query) => model.select(&query)?,
            Source::Records(records) => records
                .iter()
                .map(|record| {
                    columns
                        .iter()
                        .map(|c| record.get(c).cloned().unwrap_or(Value::Null))
                        .collect()
                })
                .collect(),
            Source::Tuples(tuples) => tuples,
        };
        Ok(rows.into_iter().map(WorkItem::new).collect())
    }
}

/// Classify a dynamic value: a list of maps is records, a list of lists
/// is tuples, and an empty list is an empty tuple list. Anything else is
/// rejected.
impl TryFrom<Value> for Source {
    type Error = PoolError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let items = match value {
            Value::List(items) => items,
            other => {
                return Err(PoolError::unrecognized_source_kind(
                    other.type_name(),
                    ACCEPTED_SOURCES,
                ))
            }
        };

        if items.iter().all(Value::is_list) {
            let tuples = items
                .into_iter()
                .filter_map(|item| match item {
                    Value::List(values) => Some(values),
                    _ => None,
                })
                .collect();
            return Ok(Source::Tuples(tuples));
        }

        if items.iter().all(Value::is_map) {
            let records = items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Map(entries) => Some(entries.into_iter().collect()),
                    _ => None,
                })
                .collect();
            return Ok(Source::Records(records));
        }

        let found = items
            .iter()
            .find(|item| !item.is_list() && !item.is_map())
            .map_or("mixed records and tuples", Value::type_name);
        Err(PoolError::unrecognized_source_kind(
            format!("List of {}", found),
            ACCEPTED_SOURCES,
        ))
    }
}
