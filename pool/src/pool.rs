//! The pool entry point.

use rowpool_core::{Value, WorkItem};
use rowpool_mutation::{IntoMutations, MutationBuilder, Serializer};
use rowpool_store::Model;
use std::sync::Arc;

use crate::config::{FailurePolicy, PoolConfig};
use crate::error::PoolResult;
use crate::executor::TransactionExecutor;
use crate::queue::WorkQueue;
use crate::source::Source;
use crate::worker::{PoolReport, WorkerPool};

/// One bulk mutation run over a model.
///
/// ```ignore
/// let report = activities
///     .pool(["id", "kind"])
///     .size(8)
///     .run(|b, row| (row[1] == Value::from("like")).then(|| b.delete(row[0].clone())))?;
/// ```
pub struct RowPool<'m, M> {
    model: &'m M,
    columns: Vec<String>,
    source: PoolResult<Source>,
    table: Option<String>,
    config: PoolConfig,
}

impl<'m, M: Model> RowPool<'m, M> {
    /// Pool over every row of `model`, projected to `columns`.
    pub fn new<I, S>(model: &'m M, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            model,
            columns: columns.into_iter().map(Into::into).collect(),
            source: Ok(Source::model()),
            table: None,
            config: PoolConfig::default(),
        }
    }

    /// Read rows from `source` instead of the whole model.
    pub fn source(mut self, source: Source) -> Self {
        self.source = Ok(source);
        self
    }

    /// Read rows from a dynamic value; an unrecognized shape fails the run.
    pub fn source_value(mut self, value: Value) -> Self {
        self.source = Source::try_from(value);
        self
    }

    /// Target instructions at `table` instead of the model's own table.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn config(mut self, config: PoolConfig) -> Self {
        self.config = config;
        self
    }

    pub fn size(mut self, size: usize) -> Self {
        self.config.size = size;
        self
    }

    pub fn serializer(mut self, serializer: Arc<dyn Serializer>) -> Self {
        self.config.serializer = serializer;
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.config.failure_policy = policy;
        self
    }

    /// Normalize the source, then drain it through the worker pool.
    ///
    /// Configuration and source shape are checked before any worker starts.
    /// Returns once every worker has exited.
    pub fn run<F, R>(self, transform: F) -> PoolResult<PoolReport>
    where
        F: Fn(&MutationBuilder, &WorkItem) -> R + Sync,
        R: IntoMutations,
    {
        self.config.validate()?;
        let workers = WorkerPool::new(self.config.size, self.config.failure_policy)?;

        let source = self.source?;
        let kind = source.kind();
        let items = source.normalize(self.model, &self.columns)?;

        let table = self
            .table
            .unwrap_or_else(|| self.model.table_name().to_string());
        tracing::info!(
            items = items.len(),
            table = %table,
            source = kind,
            workers = workers.size(),
            "migrating {} {} records",
            items.len(),
            table
        );

        let queue = WorkQueue::new(items);
        let builder = MutationBuilder::new(table, self.config.serializer);
        let executor = TransactionExecutor::new(self.model, builder, &transform);
        workers.run(&queue, &executor)
    }
}

/// `model.pool(columns)` on every [`Model`].
pub trait ModelExt: Model + Sized {
    fn pool<I, S>(&self, columns: I) -> RowPool<'_, Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RowPool::new(self, columns)
    }
}

impl<M: Model> ModelExt for M {}
