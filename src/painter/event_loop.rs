// src/painter/event_loop.rs
//! EventLoop - dedicated worker thread that applies operations to a
//! double-buffered canvas.
//!
//! Threading model:
//! - Any number of producers call `enqueue` (or hold an `OperationSender`).
//! - Exactly one worker thread dequeues, applies, and publishes. It owns both
//!   buffers; the receiver only ever sees a published frame through an `Arc`.
//! - `terminate` appends a stop marker behind all pending work, closes the
//!   queue, and blocks until the worker has drained it.
//!
//! Buffers are held as `Arc<Texture>` and mutated through `Arc::make_mut`. If
//! the receiver still holds a frame when its slot comes back around for
//! mutation, the worker copies it instead of writing into a frame that is on
//! display.

use crate::painter::op::{BoxedOperation, Operation, TextureFn};
use crate::painter::queue::{OperationQueue, QueueClosed};
use crate::painter::texture::{Size, Texture};
use log::{debug, info, trace, warn};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{sync_channel, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use thiserror::Error;

/// Consumes published frames. Called synchronously on the worker thread, so
/// implementations must return quickly.
pub trait TextureReceiver: Send + Sync {
    fn update_texture(&self, texture: Arc<Texture>);
}

/// Allocates the canvas buffers.
pub trait TextureProvider {
    fn new_texture(&self, size: Size) -> anyhow::Result<Texture>;
}

#[derive(Debug, Error)]
pub enum LoopError {
    #[error("event loop has already been started")]
    AlreadyStarted,
    #[error("event loop has been terminated")]
    Terminated,
    #[error("failed to allocate canvas buffer")]
    Allocation(#[source] anyhow::Error),
    #[error("failed to spawn event loop worker")]
    Spawn(#[source] std::io::Error),
    #[error("event loop worker exited abnormally")]
    WorkerPanicked,
}

impl From<QueueClosed> for LoopError {
    fn from(_: QueueClosed) -> Self {
        LoopError::Terminated
    }
}

/// Lifecycle of an `EventLoop` as seen by its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    /// Constructed; operations may be queued but nothing is applied yet.
    Created,
    /// Worker thread is applying operations.
    Running,
    /// Stop marker queued and the worker has drained and exited.
    Terminated,
}

/// Cloneable producer handle onto an event loop's queue.
#[derive(Clone)]
pub struct OperationSender {
    queue: Arc<OperationQueue>,
}

impl OperationSender {
    /// Queues `op` behind everything already submitted.
    ///
    /// Fails with `LoopError::Terminated` once termination was requested; an
    /// accepted operation is always applied before the loop stops.
    pub fn enqueue(&self, op: impl Operation + 'static) -> Result<(), LoopError> {
        self.enqueue_boxed(Box::new(op))
    }

    pub fn enqueue_boxed(&self, op: BoxedOperation) -> Result<(), LoopError> {
        self.queue.enqueue(op).map_err(LoopError::from)
    }

    /// Queues a batch in order.
    ///
    /// Stops at the first rejection. Operations of other producers may land
    /// between the members of the batch unless the caller serializes batches.
    pub fn enqueue_all(
        &self,
        ops: impl IntoIterator<Item = BoxedOperation>,
    ) -> Result<usize, LoopError> {
        let mut count = 0;
        for op in ops {
            self.enqueue_boxed(op)?;
            count += 1;
        }
        Ok(count)
    }

    pub fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }
}

/// Owns the worker thread and its queue.
pub struct EventLoop {
    receiver: Arc<dyn TextureReceiver>,
    size: Size,
    queue: Arc<OperationQueue>,
    stop_requested: Arc<AtomicBool>,
    frames_published: Arc<AtomicU64>,
    phase: LoopPhase,
    worker: Option<JoinHandle<()>>,
    done_rx: Option<Receiver<()>>,
}

impl EventLoop {
    pub fn new(receiver: Arc<dyn TextureReceiver>, size: Size) -> Self {
        Self {
            receiver,
            size,
            queue: Arc::new(OperationQueue::new()),
            stop_requested: Arc::new(AtomicBool::new(false)),
            frames_published: Arc::new(AtomicU64::new(0)),
            phase: LoopPhase::Created,
            worker: None,
            done_rx: None,
        }
    }

    /// Allocates both buffers and starts the worker. Returns immediately.
    pub fn initiate(&mut self, provider: &dyn TextureProvider) -> Result<(), LoopError> {
        match self.phase {
            LoopPhase::Created => {}
            LoopPhase::Running => return Err(LoopError::AlreadyStarted),
            LoopPhase::Terminated => return Err(LoopError::Terminated),
        }

        let current = provider
            .new_texture(self.size)
            .map_err(LoopError::Allocation)?;
        let last = provider
            .new_texture(self.size)
            .map_err(LoopError::Allocation)?;

        let (done_tx, done_rx) = sync_channel(1);
        let worker = Worker {
            current: Arc::new(current),
            last: Arc::new(last),
            queue: self.queue.clone(),
            receiver: self.receiver.clone(),
            stop_requested: self.stop_requested.clone(),
            frames_published: self.frames_published.clone(),
        };

        let handle = thread::Builder::new()
            .name("event-loop".to_string())
            .spawn(move || {
                worker.run();
                // Terminate may have given up waiting (e.g. dropped); ignore.
                let _ = done_tx.send(());
            })
            .map_err(LoopError::Spawn)?;

        info!(
            "EventLoop: Worker started ({}x{} canvas)",
            self.size.width, self.size.height
        );
        self.worker = Some(handle);
        self.done_rx = Some(done_rx);
        self.phase = LoopPhase::Running;
        Ok(())
    }

    /// Queues `op`. See [`OperationSender::enqueue`].
    pub fn enqueue(&self, op: impl Operation + 'static) -> Result<(), LoopError> {
        self.sender().enqueue(op)
    }

    /// A producer handle that can be moved to other threads.
    pub fn sender(&self) -> OperationSender {
        OperationSender {
            queue: self.queue.clone(),
        }
    }

    /// Requests a stop behind all pending work and blocks until the worker has
    /// applied every operation queued before this call.
    ///
    /// Calling it again is a no-op. On a loop that was never initiated the
    /// queue is closed and its pending operations are never applied.
    pub fn terminate(&mut self) -> Result<(), LoopError> {
        if self.phase == LoopPhase::Terminated {
            return Ok(());
        }

        let stop_requested = self.stop_requested.clone();
        let stop_marker = TextureFn::new(move |_| {
            stop_requested.store(true, Ordering::SeqCst);
        });
        let pending = self.queue.len();
        // Only the owner closes the queue, and only here.
        self.queue
            .close_with(Box::new(stop_marker))
            .map_err(LoopError::from)?;
        let was_running = self.phase == LoopPhase::Running;
        self.phase = LoopPhase::Terminated;

        if !was_running {
            warn!(
                "EventLoop: Terminated before initiation; {} queued operations discarded",
                pending
            );
            return Ok(());
        }

        info!(
            "EventLoop: Terminate requested, draining {} pending operations",
            pending
        );
        if let Some(done_rx) = self.done_rx.take() {
            // A closed channel means the worker died without signalling.
            if done_rx.recv().is_err() {
                warn!("EventLoop: Worker exited without completion signal");
            }
        }
        if let Some(handle) = self.worker.take() {
            handle.join().map_err(|_| LoopError::WorkerPanicked)?;
        }
        info!(
            "EventLoop: Worker stopped after {} frames",
            self.frames_published()
        );
        Ok(())
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == LoopPhase::Running
    }

    /// Number of frames handed to the receiver so far.
    pub fn frames_published(&self) -> u64 {
        self.frames_published.load(Ordering::SeqCst)
    }

    pub fn size(&self) -> Size {
        self.size
    }
}

impl Drop for EventLoop {
    fn drop(&mut self) {
        // A loop that never started still closes its queue.
        if self.phase != LoopPhase::Terminated {
            if let Err(e) = self.terminate() {
                warn!("EventLoop: Terminate on drop failed: {}", e);
            }
        }
    }
}

/// State owned by the worker thread.
struct Worker {
    /// Buffer being mutated by in-flight operations.
    current: Arc<Texture>,
    /// Buffer most recently handed to the receiver.
    last: Arc<Texture>,
    queue: Arc<OperationQueue>,
    receiver: Arc<dyn TextureReceiver>,
    stop_requested: Arc<AtomicBool>,
    frames_published: Arc<AtomicU64>,
}

impl Worker {
    fn run(mut self) {
        info!("EventLoop: Thread started");

        while !self.stop_requested.load(Ordering::SeqCst) || !self.queue.is_empty() {
            let op = self.queue.dequeue();
            let ready = op.apply(Arc::make_mut(&mut self.current));
            trace!("EventLoop: Applied operation (ready={})", ready);

            if ready {
                self.publish();
            }
        }

        info!("EventLoop: Thread stopped");
    }

    fn publish(&mut self) {
        let frame = self.frames_published.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("EventLoop: Publishing frame {}", frame);
        self.receiver.update_texture(Arc::clone(&self.current));
        std::mem::swap(&mut self.current, &mut self.last);
    }
}
