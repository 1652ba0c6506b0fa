//! Per-item transactional execution.

use rowpool_core::WorkItem;
use rowpool_mutation::{IntoMutations, MutationBuilder, MutationInstruction};
use rowpool_store::Model;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::error::ExecutionCause;

/// What one committed item did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemOutcome {
    /// Instructions the transform produced.
    pub instructions: usize,
    /// Rows those instructions touched.
    pub affected: usize,
}

/// Runs the transform for one item inside its own transaction.
///
/// A connection is leased per item and released before the next one is
/// taken, so a worker never holds more than one.
pub struct TransactionExecutor<'a, M, F> {
    model: &'a M,
    builder: MutationBuilder,
    transform: &'a F,
}

impl<'a, M: Model, F> TransactionExecutor<'a, M, F> {
    pub fn new(model: &'a M, builder: MutationBuilder, transform: &'a F) -> Self {
        Self {
            model,
            builder,
            transform,
        }
    }

    pub fn builder(&self) -> &MutationBuilder {
        &self.builder
    }

    /// Lease, begin, build, apply each instruction in order, commit.
    ///
    /// Any failure, including a panicking transform, rolls the whole item
    /// back before the cause is returned.
    pub fn execute<R>(&self, item: &WorkItem) -> Result<ItemOutcome, ExecutionCause>
    where
        F: Fn(&MutationBuilder, &WorkItem) -> R,
        R: IntoMutations,
    {
        self.model
            .with_connection(|conn| -> Result<ItemOutcome, ExecutionCause> {
                self.model
                    .transaction(conn, |conn| -> Result<ItemOutcome, ExecutionCause> {
                        let instructions = self.build(item)?;
                        let mut affected = 0;
                        for instruction in &instructions {
                            affected += self.model.execute(conn, instruction)?;
                        }
                        Ok(ItemOutcome {
                            instructions: instructions.len(),
                            affected,
                        })
                    })
            })
    }

    fn build<R>(&self, item: &WorkItem) -> Result<Vec<MutationInstruction>, ExecutionCause>
    where
        F: Fn(&MutationBuilder, &WorkItem) -> R,
        R: IntoMutations,
    {
        let result = panic::catch_unwind(AssertUnwindSafe(|| (self.transform)(&self.builder, item)))
            .map_err(|payload| ExecutionCause::panicked(panic_message(payload.as_ref())))?;
        Ok(result.into_mutations()?)
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
