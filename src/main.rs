// src/main.rs

use anyhow::Context;
use core_paint::{
    config::CONFIG,
    display::HeadlessDisplay,
    lang::{ArtboardState, CommandProcessor},
    painter::EventLoop,
    server::{self, AppState},
};
use log::{error, info, warn};
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

/// Main entry point for `core-paint`.
///
/// Usage: `core-paint [SCRIPT]`. An optional script file is replayed before
/// the HTTP endpoint starts accepting commands.
fn main() -> anyhow::Result<()> {
    // Initialize the logger. Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    info!("Starting core-paint...");
    let config = &*CONFIG;
    let script = std::env::args_os().nth(1).map(PathBuf::from);

    // --- Presentation ---
    let display = Arc::new(match &config.display.snapshot_path {
        Some(path) => HeadlessDisplay::with_snapshots(path.clone())
            .context("Failed to start snapshot writer")?,
        None => HeadlessDisplay::new(),
    });

    // --- Event Loop ---
    let mut event_loop = EventLoop::new(display.clone(), config.canvas.size());
    event_loop
        .initiate(display.as_ref())
        .context("Failed to initiate event loop")?;

    let mut processor = CommandProcessor::new(
        ArtboardState::new(config.canvas.palette),
        config.canvas.coordinate_scale,
    );

    if let Some(path) = script {
        let file = std::fs::File::open(&path)
            .with_context(|| format!("Failed to open script {}", path.display()))?;
        let ops = processor
            .process_commands(BufReader::new(file))
            .with_context(|| format!("Failed to parse script {}", path.display()))?;
        let count = event_loop.sender().enqueue_all(ops)?;
        info!("Replayed script {} ({} operations)", path.display(), count);
    }

    // --- HTTP Entry Point ---
    let state = AppState::new(event_loop.sender(), processor);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("http")
        .build()
        .context("Failed to build tokio runtime")?;

    let served = runtime.block_on(async {
        let listener = tokio::net::TcpListener::bind(&config.server.bind)
            .await
            .with_context(|| format!("Failed to bind {}", config.server.bind))?;
        server::serve(listener, state, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
            info!("Ctrl-C received, shutting down");
        })
        .await
        .context("HTTP server failed")
    });
    if let Err(e) = &served {
        error!("{:#}", e);
    }

    // --- Cleanup ---
    info!("Draining event loop...");
    event_loop
        .terminate()
        .context("Failed to terminate event loop")?;
    info!(
        "core-paint exited ({} frames presented)",
        display.frames_presented()
    );

    served
}
