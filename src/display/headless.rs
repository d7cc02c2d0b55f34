// src/display/headless.rs
//! Headless display - allocates canvas buffers and receives published frames
//! without a window.
//!
//! It keeps the most recent frame and a frame counter, lets other threads
//! wait for frames, and can hand every frame to a `SnapshotWriter`.

use crate::display::snapshot::SnapshotWriter;
use crate::painter::{Size, Texture, TextureProvider, TextureReceiver};
use anyhow::{bail, Result};
use log::{debug, info};
use std::path::PathBuf;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Default)]
struct PresentState {
    last_frame: Option<Arc<Texture>>,
    frames_presented: u64,
}

pub struct HeadlessDisplay {
    state: Mutex<PresentState>,
    frame_ready: Condvar,
    snapshots: Option<SnapshotWriter>,
}

impl Default for HeadlessDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessDisplay {
    pub fn new() -> Self {
        info!("HeadlessDisplay: Created");
        Self {
            state: Mutex::new(PresentState::default()),
            frame_ready: Condvar::new(),
            snapshots: None,
        }
    }

    /// Writes every presented frame to `path` as a PNG.
    pub fn with_snapshots(path: PathBuf) -> Result<Self> {
        let mut display = Self::new();
        display.snapshots = Some(SnapshotWriter::spawn(path)?);
        Ok(display)
    }

    fn lock(&self) -> MutexGuard<'_, PresentState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The most recently presented frame.
    pub fn last_frame(&self) -> Option<Arc<Texture>> {
        self.lock().last_frame.clone()
    }

    pub fn frames_presented(&self) -> u64 {
        self.lock().frames_presented
    }

    /// Blocks until at least `count` frames have been presented or `timeout`
    /// elapses. Returns whether the count was reached.
    pub fn wait_for_frames(&self, count: u64, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.lock();
        while state.frames_presented < count {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            state = self
                .frame_ready
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        true
    }
}

impl TextureProvider for HeadlessDisplay {
    fn new_texture(&self, size: Size) -> Result<Texture> {
        if size.is_empty() {
            bail!(
                "cannot allocate a {}x{} texture",
                size.width,
                size.height
            );
        }
        debug!(
            "HeadlessDisplay: Allocating {}x{} texture",
            size.width, size.height
        );
        Ok(Texture::new(size))
    }
}

impl TextureReceiver for HeadlessDisplay {
    fn update_texture(&self, texture: Arc<Texture>) {
        if let Some(snapshots) = &self.snapshots {
            snapshots.submit(texture.clone());
        }

        let mut state = self.lock();
        state.frames_presented += 1;
        debug!("HeadlessDisplay: Present frame {}", state.frames_presented);
        state.last_frame = Some(texture);
        drop(state);
        self.frame_ready.notify_all();
    }
}
