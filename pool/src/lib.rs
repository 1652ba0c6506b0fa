//! rowpool
//!
//! Drain a set of rows through a fixed pool of concurrent workers, each
//! applying a per-row transform's mutations in its own transaction.
//!
//! Responsibilities:
//! - Normalize a model scope, select query, records or tuples into work items
//! - Hand each item to exactly one worker through a locked queue
//! - Run each item's instructions atomically, rolling back on failure
//! - Join every worker, then report totals or the collected failures
//!
//! # Module Structure
//!
//! - `source` - Source shapes and normalization into work items
//! - `queue` - WorkQueue, the shared take-next queue
//! - `executor` - TransactionExecutor, one item per transaction
//! - `worker` - WorkerPool and PoolReport
//! - `pool` - RowPool builder and the `Model::pool` extension
//! - `config` - PoolConfig and FailurePolicy
//! - `error` - Error types for pool runs

mod config;
mod error;
mod executor;
mod pool;
mod queue;
mod source;
mod worker;

pub use config::{FailurePolicy, PoolConfig, DEFAULT_SIZE, FAILURE_POLICY_ENV, SIZE_ENV};
pub use error::{ExecutionCause, MutationExecutionError, PoolError, PoolResult};
pub use executor::{ItemOutcome, TransactionExecutor};
pub use pool::{ModelExt, RowPool};
pub use queue::WorkQueue;
pub use source::{Record, Source, ACCEPTED_SOURCES};
pub use worker::{PoolReport, WorkerPool};

pub use rowpool_core::{attrs, Attributes, RowId, Value, WorkItem};
pub use rowpool_mutation::{
    IntoMutations, JsonSerializer, MutationBuilder, MutationError, MutationInstruction,
    MutationResult, Serializer,
};

/// Everything a typical pool call site needs.
pub mod prelude {
    pub use crate::{
        attrs, FailurePolicy, ModelExt, MutationBuilder, MutationError, MutationInstruction,
        MutationResult, PoolConfig, PoolError, RowPool, Source, Value, WorkItem,
    };
}
