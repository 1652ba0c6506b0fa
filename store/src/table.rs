//! In-memory table storage.

use rowpool_core::{Attributes, Row, RowId, Value};
use std::collections::BTreeMap;

use crate::error::{StoreError, StoreResult};
use crate::query::Scope;

/// Primary-key allocator. Keys start at 1 and are never reused.
#[derive(Debug)]
struct IdAllocator {
    next_id: i64,
}

impl IdAllocator {
    fn new() -> Self {
        Self { next_id: 1 }
    }

    fn alloc(&mut self) -> RowId {
        let id = RowId::new(self.next_id);
        self.next_id += 1;
        id
    }
}

/// One table: declared columns plus rows kept in primary-key order.
#[derive(Debug)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    rows: BTreeMap<RowId, Row>,
    id_alloc: IdAllocator,
}

impl Table {
    /// Create an empty table. `id` is implicit and need not be declared.
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns
                .into_iter()
                .map(Into::into)
                .filter(|c: &String| c != "id")
                .collect(),
            rows: BTreeMap::new(),
            id_alloc: IdAllocator::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// True for declared columns and the implicit `id`.
    pub fn has_column(&self, column: &str) -> bool {
        column == "id" || self.columns.iter().any(|c| c == column)
    }

    /// Get a row by primary key.
    pub fn get(&self, id: RowId) -> Option<&Row> {
        self.rows.get(&id)
    }

    // ==================== Writes ====================

    /// Insert a new row and return its key.
    pub fn insert(&mut self, values: Attributes) -> StoreResult<RowId> {
        self.check_writable(&values)?;
        let id = self.id_alloc.alloc();
        self.rows.insert(id, Row::new(id, values));
        Ok(id)
    }

    /// Overwrite columns of an existing row.
    ///
    /// Returns the previous value of each touched column (`None` where the
    /// column was unset), or `None` if no row has that key.
    pub fn update(
        &mut self,
        id: RowId,
        values: &Attributes,
    ) -> StoreResult<Option<Vec<(String, Option<Value>)>>> {
        self.check_writable(values)?;
        let Some(row) = self.rows.get_mut(&id) else {
            return Ok(None);
        };

        let mut previous = Vec::with_capacity(values.len());
        for (column, value) in values {
            let old = row.set(column.clone(), value.clone());
            previous.push((column.clone(), old));
        }
        Ok(Some(previous))
    }

    /// Remove a row, returning it.
    pub fn delete(&mut self, id: RowId) -> Option<Row> {
        self.rows.remove(&id)
    }

    /// Put back a row removed by [`Table::delete`].
    pub fn restore(&mut self, row: Row) {
        self.rows.insert(row.id, row);
    }

    /// Undo an update using the previous values it returned.
    pub fn revert(&mut self, id: RowId, previous: Vec<(String, Option<Value>)>) -> StoreResult<()> {
        let row = self
            .rows
            .get_mut(&id)
            .ok_or_else(|| StoreError::row_not_found(&self.name, id))?;
        for (column, old) in previous.into_iter().rev() {
            match old {
                Some(value) => {
                    row.set(column, value);
                }
                None => {
                    row.values.remove(&column);
                }
            }
        }
        Ok(())
    }

    // ==================== Reads ====================

    /// Iterate rows in scope, in key order.
    pub fn scan<'a>(&'a self, scope: &'a Scope) -> impl Iterator<Item = &'a Row> + 'a {
        self.rows.values().filter(move |row| scope.matches(row))
    }

    /// Count rows in scope.
    pub fn count(&self, scope: &Scope) -> usize {
        self.scan(scope).count()
    }

    /// Project `columns` of every row in scope.
    pub fn project(
        &self,
        scope: &Scope,
        columns: &[String],
        limit: Option<usize>,
    ) -> StoreResult<Vec<Vec<Value>>> {
        if let Some(unknown) = columns.iter().find(|c| !self.has_column(c)) {
            return Err(StoreError::unknown_column(&self.name, unknown));
        }
        Ok(self
            .scan(scope)
            .take(limit.unwrap_or(usize::MAX))
            .map(|row| row.project(columns))
            .collect())
    }

    // ==================== Validation ====================

    /// Every column must be declared and every value scalar. `id` is not writable.
    fn check_writable(&self, values: &Attributes) -> StoreResult<()> {
        for (column, value) in values {
            if column == "id" || !self.has_column(column) {
                return Err(StoreError::unknown_column(&self.name, column));
            }
            if value.is_composite() {
                return Err(StoreError::composite_value(&self.name, column, value.type_name()));
            }
        }
        Ok(())
    }
}
