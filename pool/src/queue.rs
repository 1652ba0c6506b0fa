//! The shared work queue.

use parking_lot::Mutex;
use rowpool_core::WorkItem;
use std::collections::VecDeque;

/// Ordered work items behind one lock.
///
/// The lock is held only for take-and-remove, never across a transaction.
#[derive(Debug, Default)]
pub struct WorkQueue {
    items: Mutex<VecDeque<WorkItem>>,
}

impl WorkQueue {
    /// Queue `items`, preserving their order.
    pub fn new(items: Vec<WorkItem>) -> Self {
        Self {
            items: Mutex::new(items.into()),
        }
    }

    /// Remove the front item, or `None` once the queue is exhausted.
    pub fn take(&self) -> Option<WorkItem> {
        self.items.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}
