// src/display/snapshot.rs
//! SnapshotWriter - dedicated thread that writes presented frames as PNG.
//!
//! Frames arrive over an unbounded channel so the event loop worker never
//! waits on disk I/O. When frames arrive faster than they can be written,
//! only the newest pending frame is written.

use crate::painter::Texture;
use anyhow::{Context, Result};
use image::{ImageFormat, RgbaImage};
use log::{info, trace, warn};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

pub struct SnapshotWriter {
    tx: Option<Sender<Arc<Texture>>>,
    handle: Option<JoinHandle<()>>,
}

impl SnapshotWriter {
    pub fn spawn(path: PathBuf) -> Result<Self> {
        let (tx, rx) = channel();
        let handle = thread::Builder::new()
            .name("snapshot".to_string())
            .spawn(move || run(&path, rx))
            .context("Failed to spawn snapshot thread")?;
        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
        })
    }

    /// Queues a frame for writing. Never blocks.
    pub fn submit(&self, frame: Arc<Texture>) {
        if let Some(tx) = &self.tx {
            if tx.send(frame).is_err() {
                warn!("SnapshotWriter: Thread gone, frame dropped");
            }
        }
    }
}

impl Drop for SnapshotWriter {
    fn drop(&mut self) {
        // Closing the channel lets the thread finish the pending frame and exit.
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("SnapshotWriter: Thread panicked");
            }
        }
    }
}

fn run(path: &Path, rx: Receiver<Arc<Texture>>) {
    info!("SnapshotWriter: Thread started, writing to {}", path.display());
    while let Ok(mut frame) = rx.recv() {
        while let Ok(newer) = rx.try_recv() {
            frame = newer;
        }
        match write_png(&frame, path) {
            Ok(()) => trace!("SnapshotWriter: Wrote {}", path.display()),
            Err(e) => warn!("SnapshotWriter: {:#}", e),
        }
    }
    info!("SnapshotWriter: Thread stopped");
}

/// Encodes `texture` as a PNG at `path`.
pub fn write_png(texture: &Texture, path: &Path) -> Result<()> {
    let size = texture.size();
    let image = RgbaImage::from_raw(size.width, size.height, texture.as_bytes().to_vec())
        .context("Texture byte length does not match its size")?;
    image
        .save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
    Ok(())
}
