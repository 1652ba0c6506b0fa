//! Row selection: equality scopes and structured select queries.

use rowpool_core::{Row, Value};

/// Equality condition on one column.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    /// A missing column compares equal only to null.
    pub fn matches(&self, row: &Row) -> bool {
        row.get(&self.column).unwrap_or(Value::Null) == self.value
    }
}

/// A conjunction of equality filters. The empty scope selects every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    filters: Vec<Filter>,
}

impl Scope {
    /// Scope over every row.
    pub fn all() -> Self {
        Self::default()
    }

    /// Narrow the scope to rows whose `column` equals `value`.
    pub fn where_eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.filters.iter().all(|f| f.matches(row))
    }
}

/// A select that has been described but not yet run.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    pub table: String,
    pub projection: Vec<String>,
    pub scope: Scope,
    pub limit: Option<usize>,
}

impl SelectQuery {
    /// Start a query over `table` with an empty projection.
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            projection: Vec::new(),
            scope: Scope::all(),
            limit: None,
        }
    }

    /// Set the projected columns, in result order.
    pub fn project<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn where_eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.scope = self.scope.where_eq(column, value);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
