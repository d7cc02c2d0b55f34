// src/painter/queue.rs
//! OperationQueue - unbounded, thread-safe FIFO of pending operations.
//!
//! Producers never block. The single retriever blocks in `dequeue` until an
//! operation is available. Waiting uses a one-shot `WaitSignal` that the
//! retriever arms under the queue lock and the next `enqueue` fires and
//! disarms; a fresh signal is armed for every wait cycle.

use crate::painter::op::BoxedOperation;
use log::trace;
use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Returned by [`OperationQueue::enqueue`] once the queue has been closed.
/// Carries the rejected operation back to the caller.
#[derive(Error)]
#[error("operation queue is closed")]
pub struct QueueClosed(pub BoxedOperation);

impl std::fmt::Debug for QueueClosed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("QueueClosed(..)")
    }
}

/// A single-shot wake-up. Once fired it stays fired; it is never re-armed.
#[derive(Default)]
struct WaitSignal {
    fired: Mutex<bool>,
    cond: Condvar,
}

impl WaitSignal {
    fn fire(&self) {
        *lock(&self.fired) = true;
        self.cond.notify_all();
    }

    fn wait(&self) {
        let mut fired = lock(&self.fired);
        while !*fired {
            fired = self.cond.wait(fired).unwrap_or_else(PoisonError::into_inner);
        }
    }
}

#[derive(Default)]
struct QueueState {
    operations: VecDeque<BoxedOperation>,
    /// Armed while a retriever is blocked on an empty queue.
    waiter: Option<Arc<WaitSignal>>,
    closed: bool,
}

/// The queue shared between producers and the event loop worker.
#[derive(Default)]
pub struct OperationQueue {
    state: Mutex<QueueState>,
}

// Every critical section leaves `QueueState` consistent, so a panic elsewhere
// while holding the lock does not invalidate it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl OperationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `op` to the tail and wakes a blocked retriever, if any.
    pub fn enqueue(&self, op: BoxedOperation) -> Result<(), QueueClosed> {
        let mut state = lock(&self.state);
        if state.closed {
            return Err(QueueClosed(op));
        }
        Self::push_locked(&mut state, op);
        Ok(())
    }

    /// Appends a final operation and closes the queue in one step, so nothing
    /// can be enqueued behind it.
    pub fn close_with(&self, op: BoxedOperation) -> Result<(), QueueClosed> {
        let mut state = lock(&self.state);
        if state.closed {
            return Err(QueueClosed(op));
        }
        Self::push_locked(&mut state, op);
        state.closed = true;
        Ok(())
    }

    fn push_locked(state: &mut QueueState, op: BoxedOperation) {
        state.operations.push_back(op);
        if let Some(signal) = state.waiter.take() {
            trace!("OperationQueue: waking blocked retriever");
            signal.fire();
        }
    }

    /// Removes and returns the head, blocking while the queue is empty.
    pub fn dequeue(&self) -> BoxedOperation {
        let mut state = lock(&self.state);
        loop {
            if let Some(op) = state.operations.pop_front() {
                return op;
            }

            let signal = state
                .waiter
                .get_or_insert_with(|| Arc::new(WaitSignal::default()))
                .clone();

            // Release the queue lock before waiting so producers can append.
            drop(state);
            signal.wait();
            state = lock(&self.state);
        }
    }

    /// Snapshot of emptiness. Stale as soon as it is returned.
    pub fn is_empty(&self) -> bool {
        lock(&self.state).operations.is_empty()
    }

    pub fn len(&self) -> usize {
        lock(&self.state).operations.len()
    }

    pub fn is_closed(&self) -> bool {
        lock(&self.state).closed
    }

    /// Whether a retriever currently has a wait signal armed.
    pub fn has_waiter(&self) -> bool {
        lock(&self.state).waiter.is_some()
    }
}
