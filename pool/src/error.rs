//! Pool error types.

use rowpool_core::WorkItem;
use rowpool_mutation::MutationError;
use rowpool_store::StoreError;
use thiserror::Error;

/// Why one item's transaction was rolled back.
#[derive(Debug, Error)]
pub enum ExecutionCause {
    /// The transform returned an error, or its result could not be built.
    #[error("transform error: {0}")]
    Transform(#[from] MutationError),

    /// The datastore rejected an instruction or the transaction.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The transform panicked.
    #[error("transform panicked: {message}")]
    Panicked { message: String },
}

impl ExecutionCause {
    pub fn panicked(message: impl Into<String>) -> Self {
        Self::Panicked {
            message: message.into(),
        }
    }
}

/// One failed item: which worker ran it, the item itself, and the cause.
#[derive(Debug, Error)]
#[error("worker {worker} failed on {item}: {cause}")]
pub struct MutationExecutionError {
    pub worker: usize,
    pub item: WorkItem,
    #[source]
    pub cause: ExecutionCause,
}

/// Pool errors.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The source matched none of the accepted shapes.
    #[error("unrecognized source kind: {found}; expected one of: {accepted}")]
    UnrecognizedSourceKind {
        found: String,
        accepted: &'static str,
    },

    /// Worker count is not a positive integer. `size` is the value as given.
    #[error("invalid worker count: {size}; size must be a positive integer")]
    InvalidWorkerCount { size: String },

    /// Configuration value could not be understood.
    #[error("invalid configuration for {key}: {message}")]
    InvalidConfig { key: String, message: String },

    /// One or more items failed; raised once every worker has joined.
    #[error("{} item(s) failed, {} left unprocessed", .failures.len(), .unprocessed)]
    MutationExecution {
        failures: Vec<MutationExecutionError>,
        unprocessed: usize,
    },

    /// The datastore failed while the source was being read.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A worker thread could not be started. The workers that did start
    /// still drained the queue; their failures are kept in `failures`.
    #[error("failed to spawn worker: {source}")]
    Spawn {
        #[source]
        source: std::io::Error,
        failures: Vec<MutationExecutionError>,
    },
}

impl PoolError {
    pub fn unrecognized_source_kind(found: impl Into<String>, accepted: &'static str) -> Self {
        Self::UnrecognizedSourceKind {
            found: found.into(),
            accepted,
        }
    }

    pub fn invalid_worker_count(size: impl ToString) -> Self {
        Self::InvalidWorkerCount {
            size: size.to_string(),
        }
    }

    pub fn invalid_config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Per-item failures gathered from the workers that ran.
    pub fn failures(&self) -> &[MutationExecutionError] {
        match self {
            PoolError::MutationExecution { failures, .. } => failures,
            PoolError::Spawn { failures, .. } => failures,
            _ => &[],
        }
    }
}

/// Result type for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;
