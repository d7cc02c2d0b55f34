// src/painter/mod.rs
//! The asynchronous drawing core.
//!
//! - `op`: operations that mutate a texture and report readiness
//! - `queue`: the blocking FIFO between producers and the worker
//! - `event_loop`: the worker that applies operations and publishes frames

pub mod event_loop;
pub mod op;
pub mod queue;
pub mod texture;

pub use event_loop::{
    EventLoop, LoopError, LoopPhase, OperationSender, TextureProvider, TextureReceiver,
};
pub use op::{
    draw_rectangle, fill_texture, BoxedOperation, CompositeOperation, Figure, MarkReady,
    Operation, TextureFn,
};
pub use queue::{OperationQueue, QueueClosed};
pub use texture::{Rect, Size, Texture};

#[cfg(test)]
mod tests;
