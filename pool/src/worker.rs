//! The fixed-size worker pool.
//!
//! Workers are scoped OS threads. Each loops take-next, execute, until the
//! queue is exhausted or (under [`FailurePolicy::StopWorker`]) its own item
//! fails. The pool returns only after every worker has been joined.

use rowpool_core::WorkItem;
use rowpool_mutation::{IntoMutations, MutationBuilder};
use rowpool_store::Model;
use std::thread;

use crate::config::FailurePolicy;
use crate::error::{ExecutionCause, MutationExecutionError, PoolError, PoolResult};
use crate::executor::{panic_message, TransactionExecutor};
use crate::queue::WorkQueue;

/// Totals for one completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolReport {
    /// Items queued.
    pub items: usize,
    /// Items whose transaction committed.
    pub processed: usize,
    /// Items whose transaction was rolled back.
    pub failed: usize,
    /// Instructions applied across committed items.
    pub instructions: usize,
    /// Rows affected across committed items.
    pub affected: usize,
    /// Workers launched.
    pub workers: usize,
}

#[derive(Debug, Default)]
struct WorkerOutcome {
    processed: usize,
    instructions: usize,
    affected: usize,
    failures: Vec<MutationExecutionError>,
}

/// Launches and joins a fixed number of workers over one queue.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    size: usize,
    failure_policy: FailurePolicy,
}

impl WorkerPool {
    pub fn new(size: usize, failure_policy: FailurePolicy) -> PoolResult<Self> {
        if size == 0 {
            return Err(PoolError::invalid_worker_count(0));
        }
        Ok(Self {
            size,
            failure_policy,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Drain `queue` through `executor` and wait for every worker.
    ///
    /// Failures from all workers are gathered and raised together once the
    /// last one has exited.
    pub fn run<M, F, R>(
        &self,
        queue: &WorkQueue,
        executor: &TransactionExecutor<'_, M, F>,
    ) -> PoolResult<PoolReport>
    where
        M: Model,
        F: Fn(&MutationBuilder, &WorkItem) -> R + Sync,
        R: IntoMutations,
    {
        let items = queue.len();
        let policy = self.failure_policy;

        let (outcomes, spawn_error) = thread::scope(|s| {
            let mut handles = Vec::with_capacity(self.size);
            let mut spawn_error = None;
            for worker in 0..self.size {
                let spawned = thread::Builder::new()
                    .name(format!("rowpool-worker-{}", worker))
                    .spawn_scoped(s, move || drain(worker, queue, executor, policy));
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(e) => {
                        spawn_error = Some(e);
                        break;
                    }
                }
            }

            let outcomes: Vec<WorkerOutcome> = handles
                .into_iter()
                .enumerate()
                .map(|(worker, handle)| {
                    handle.join().unwrap_or_else(|payload| {
                        let message = panic_message(payload.as_ref());
                        tracing::warn!(worker, error = %message, "worker crashed");
                        WorkerOutcome {
                            failures: vec![MutationExecutionError {
                                worker,
                                item: WorkItem::default(),
                                cause: ExecutionCause::panicked(message),
                            }],
                            ..WorkerOutcome::default()
                        }
                    })
                })
                .collect();
            (outcomes, spawn_error)
        });

        self.finish(items, outcomes, spawn_error, queue.len())
    }

    /// Fold the joined worker outcomes into a report or an aggregate error.
    fn finish(
        &self,
        items: usize,
        outcomes: Vec<WorkerOutcome>,
        spawn_error: Option<std::io::Error>,
        unprocessed: usize,
    ) -> PoolResult<PoolReport> {
        let mut report = PoolReport {
            items,
            workers: self.size,
            ..PoolReport::default()
        };
        let mut failures = Vec::new();
        for outcome in outcomes {
            report.processed += outcome.processed;
            report.instructions += outcome.instructions;
            report.affected += outcome.affected;
            failures.extend(outcome.failures);
        }
        report.failed = failures.len();
        failures.sort_by_key(|f| f.worker);

        if let Some(source) = spawn_error {
            tracing::warn!(
                error = %source,
                processed = report.processed,
                failed = report.failed,
                "worker spawn failed"
            );
            return Err(PoolError::Spawn { source, failures });
        }

        tracing::info!(
            items = report.items,
            processed = report.processed,
            failed = report.failed,
            unprocessed,
            "pool finished"
        );

        if failures.is_empty() {
            Ok(report)
        } else {
            Err(PoolError::MutationExecution {
                failures,
                unprocessed,
            })
        }
    }
}

fn drain<M, F, R>(
    worker: usize,
    queue: &WorkQueue,
    executor: &TransactionExecutor<'_, M, F>,
    policy: FailurePolicy,
) -> WorkerOutcome
where
    M: Model,
    F: Fn(&MutationBuilder, &WorkItem) -> R,
    R: IntoMutations,
{
    let mut outcome = WorkerOutcome::default();
    while let Some(item) = queue.take() {
        match executor.execute(&item) {
            Ok(done) => {
                outcome.processed += 1;
                outcome.instructions += done.instructions;
                outcome.affected += done.affected;
            }
            Err(cause) => {
                tracing::warn!(worker, item = %item, error = %cause, "item rolled back");
                outcome.failures.push(MutationExecutionError {
                    worker,
                    item,
                    cause,
                });
                if policy == FailurePolicy::StopWorker {
                    break;
                }
            }
        }
    }
    tracing::debug!(worker, processed = outcome.processed, "worker exiting");
    outcome
}
