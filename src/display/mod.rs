// src/display/mod.rs
//! Presentation side of the event loop.
//!
//! - HeadlessDisplay: allocates canvas buffers and receives published frames
//! - SnapshotWriter: background PNG output of presented frames

pub mod headless;
pub mod snapshot;

pub use headless::HeadlessDisplay;
pub use snapshot::{write_png, SnapshotWriter};
