// src/lib.rs

//! core-paint: a drawing surface driven by textual commands.
//!
//! Commands are parsed into texture operations (`lang`), queued, and applied
//! by a single event loop worker to a double-buffered canvas (`painter`).
//! Finished frames go to a receiver (`display`). Commands arrive over HTTP
//! (`server`) or from a script file.

pub mod color;
pub mod config;
pub mod display;
pub mod lang;
pub mod painter;
pub mod server;
