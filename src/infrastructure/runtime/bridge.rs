//! Runtime bridge - connects the sync TUI thread with the async page loader
//!
//! The TUI thread sends load requests and polls for finished pages once per
//! loop iteration; pages are built on a Tokio runtime hosted by a dedicated
//! thread.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use crate::infrastructure::runtime::worker::{run_async_worker, DataSource, LoadedPage, LoaderSettings};
use crate::router::PageId;

/// Commands sent from the TUI to the async worker
#[derive(Debug, Clone)]
pub enum RuntimeCommand {
    /// Build a page; the id is echoed back so stale results can be dropped
    LoadPage { page: PageId, request_id: u64 },
    /// Shutdown the worker
    Shutdown,
}

/// Events sent from the async worker to the TUI
#[derive(Debug)]
pub enum RuntimeEvent {
    PageLoaded { request_id: u64, page: LoadedPage },
    PageFailed {
        request_id: u64,
        page: PageId,
        error: String,
    },
}

/// Bridge between sync TUI thread and async Tokio runtime
pub struct RuntimeBridge {
    cmd_tx: Sender<RuntimeCommand>,
    evt_rx: Receiver<RuntimeEvent>,
}

impl RuntimeBridge {
    pub fn new(source: Arc<dyn DataSource>, settings: LoaderSettings) -> anyhow::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<RuntimeCommand>();
        let (evt_tx, evt_rx) = mpsc::channel::<RuntimeEvent>();

        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;

        thread::Builder::new()
            .name("gridboard-loader".into())
            .spawn(move || {
                rt.block_on(async {
                    if let Err(err) = run_async_worker(source, settings, cmd_rx, evt_tx).await {
                        tracing::error!(error = %err, "loader exited");
                    }
                });
            })?;

        Ok(Self { cmd_tx, evt_rx })
    }

    /// Send a command to the async worker
    pub fn send(&self, cmd: RuntimeCommand) -> anyhow::Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| anyhow::anyhow!("Worker channel closed"))
    }

    /// Poll for events (non-blocking)
    pub fn poll_events(&self) -> Vec<RuntimeEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.evt_rx.try_recv() {
            events.push(evt);
        }
        events
    }
}

impl Drop for RuntimeBridge {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(RuntimeCommand::Shutdown);
    }
}
