//! Queued front door for item grants
//!
//! Callers hand requests to a background loop over a bounded channel and
//! get the outcome back on a oneshot. Each request runs as its own task,
//! so slow storage for one recipient does not hold up the others.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tracing::{debug, error, info};

use crate::error::{GrantError, GrantResult};
use crate::game::GameContext;
use crate::handlers::{add_item_to_player, GrantReceipt};

/// A grant waiting to be executed by the service loop
#[derive(Debug)]
pub struct GrantRequest {
    pub recipient: String,
    pub item_type: u16,
    reply: oneshot::Sender<GrantResult<GrantReceipt>>,
}

/// Cloneable sender side of the grant service
#[derive(Debug, Clone)]
pub struct GrantHandle {
    tx: mpsc::Sender<GrantRequest>,
}

impl GrantHandle {
    /// Queue a grant and wait for it to finish.
    pub async fn grant(
        &self,
        recipient: impl Into<String>,
        item_type: u16,
    ) -> GrantResult<GrantReceipt> {
        let (reply, rx) = oneshot::channel();
        let request = GrantRequest {
            recipient: recipient.into(),
            item_type,
            reply,
        };

        self.tx
            .send(request)
            .await
            .map_err(|_| GrantError::ServiceUnavailable)?;

        // The request was taken, so a dropped reply is not a clean refusal
        rx.await.map_err(|_| GrantError::ReplyLost)?
    }
}

/// Background loop executing queued grants
pub struct GrantService {
    handle: GrantHandle,
    shutdown_tx: oneshot::Sender<()>,
    worker: JoinHandle<()>,
}

impl GrantService {
    /// Start the service loop on the current runtime.
    pub fn spawn(ctx: Arc<GameContext>, queue_size: usize) -> Self {
        let (tx, rx) = mpsc::channel(queue_size.max(1));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let worker = tokio::spawn(run(ctx, rx, shutdown_rx));

        Self {
            handle: GrantHandle { tx },
            shutdown_tx,
            worker,
        }
    }

    pub fn handle(&self) -> GrantHandle {
        self.handle.clone()
    }

    /// Stop taking requests, finish the queued and running ones, then return.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.worker.await {
            error!("Grant service loop ended abnormally: {}", e);
        }
    }
}

async fn run(
    ctx: Arc<GameContext>,
    mut rx: mpsc::Receiver<GrantRequest>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let mut tasks = JoinSet::new();
    info!("Grant service started");

    loop {
        tokio::select! {
            _ = &mut shutdown_rx => {
                rx.close();
                break;
            }
            request = rx.recv() => match request {
                Some(request) => {
                    tasks.spawn(execute(ctx.clone(), request));
                }
                None => break,
            },
            Some(joined) = tasks.join_next(), if !tasks.is_empty() => log_task_end(joined),
        }
    }

    // Requests already queued before the close still get an answer
    while let Some(request) = rx.recv().await {
        tasks.spawn(execute(ctx.clone(), request));
    }
    while let Some(joined) = tasks.join_next().await {
        log_task_end(joined);
    }

    info!("Grant service stopped");
}

fn log_task_end(joined: Result<(), JoinError>) {
    if let Err(e) = joined {
        error!("Grant task ended abnormally: {}", e);
    }
}

async fn execute(ctx: Arc<GameContext>, request: GrantRequest) {
    let result = add_item_to_player(&ctx, &request.recipient, request.item_type).await;
    if request.reply.send(result).is_err() {
        debug!("Caller for grant to {} went away", request.recipient);
    }
}
