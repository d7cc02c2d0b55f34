// src/server/mod.rs
//! HTTP entry point for drawing commands.
//!
//! `GET /?cmd=<script>` and `POST /` (script in the body) are both accepted.
//! A script is parsed in full before anything is queued: on success every
//! resulting operation is enqueued in order, on failure nothing is.

use crate::lang::CommandProcessor;
use crate::painter::{LoopError, OperationSender};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use log::{debug, error, info, warn};
use serde::Deserialize;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::net::TcpListener;

/// Shared by every request handler.
pub struct AppState {
    sender: OperationSender,
    processor: Mutex<CommandProcessor>,
}

impl AppState {
    pub fn new(sender: OperationSender, processor: CommandProcessor) -> Arc<Self> {
        Arc::new(Self {
            sender,
            processor: Mutex::new(processor),
        })
    }

    /// Parses `script` and queues its operations.
    ///
    /// The processor lock is held while enqueuing, so the batches of
    /// concurrent submissions never interleave. The artboard only keeps the
    /// effect of a script whose operations were all accepted by the loop.
    pub fn submit(&self, script: &str) -> (StatusCode, String) {
        let mut processor = self
            .processor
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let commands = match processor.parse_script(script.as_bytes()) {
            Ok(commands) => commands,
            Err(e) => {
                warn!("server: Rejected script: {}", e);
                return (StatusCode::BAD_REQUEST, format!("{e}\n"));
            }
        };

        if self.sender.is_closed() {
            return terminated();
        }

        let saved = processor.artboard().clone();
        let ops = processor.apply_commands(&commands);
        match self.sender.enqueue_all(ops) {
            Ok(count) => {
                debug!("server: Enqueued {} operations", count);
                (StatusCode::OK, format!("enqueued {count} operations\n"))
            }
            Err(e) => {
                processor.replace_artboard(saved);
                match e {
                    LoopError::Terminated => terminated(),
                    e => (StatusCode::INTERNAL_SERVER_ERROR, format!("{e}\n")),
                }
            }
        }
    }
}

fn terminated() -> (StatusCode, String) {
    warn!("server: Event loop terminated, script dropped");
    (
        StatusCode::SERVICE_UNAVAILABLE,
        "event loop has terminated\n".to_string(),
    )
}

#[derive(Debug, Deserialize)]
struct CommandQuery {
    cmd: Option<String>,
}

/// Builds the command router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(submit_query).post(submit_body))
        .with_state(state)
}

async fn submit_query(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CommandQuery>,
) -> (StatusCode, String) {
    submit_blocking(state, query.cmd.unwrap_or_default()).await
}

async fn submit_body(State(state): State<Arc<AppState>>, body: String) -> (StatusCode, String) {
    submit_blocking(state, body).await
}

/// Runs `submit` on the blocking pool; it waits on the processor lock.
async fn submit_blocking(state: Arc<AppState>, script: String) -> (StatusCode, String) {
    match tokio::task::spawn_blocking(move || state.submit(&script)).await {
        Ok(response) => response,
        Err(e) => {
            error!("server: Submit task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "submission failed\n".to_string(),
            )
        }
    }
}

/// Serves `router(state)` on `listener` until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("server: Listening on http://{}", addr);
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("server: Stopped");
    Ok(())
}
