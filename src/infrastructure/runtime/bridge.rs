//! Runtime bridge - connects sync TUI thread with async Tokio runtime
//!
//! The worker thread runs a current-thread Tokio runtime, so every RPC call
//! of every probe interleaves on that one thread.

use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use tokio::runtime::Builder;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

use crate::domain::probe::{ProbeError, ProbeReport, ProbeTicket};
use crate::domain::NetworkId;
use crate::infrastructure::runtime::worker::run_async_worker;

/// Commands sent from the TUI to the async worker
#[derive(Debug, Clone)]
pub enum RuntimeCommand {
    /// Rebuild the chain client for another network
    SelectNetwork { network: NetworkId },
    /// Execute the reads for an issued ticket
    Probe { ticket: ProbeTicket },
    /// Shutdown the worker
    Shutdown,
}

/// Events sent from the async worker to the TUI
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A chain client is ready for the network
    ClientReady { network: NetworkId, endpoint: String },
    /// A probe finished (successfully or not)
    ProbeDone {
        ticket: ProbeTicket,
        outcome: Result<ProbeReport, ProbeError>,
    },
    /// Error occurred
    Error { message: String },
}

/// Bridge between sync TUI thread and async Tokio runtime
pub struct RuntimeBridge {
    cmd_tx: UnboundedSender<RuntimeCommand>,
    evt_rx: Receiver<RuntimeEvent>,
}

impl RuntimeBridge {
    /// Start the worker for `network`; each probe is bounded by `timeout`
    pub fn new(network: NetworkId, timeout: Duration) -> anyhow::Result<Self> {
        let (cmd_tx, cmd_rx) = unbounded_channel::<RuntimeCommand>();
        let (evt_tx, evt_rx) = mpsc::channel::<RuntimeEvent>();

        let rt = Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to create Tokio runtime")?;

        thread::Builder::new()
            .name("probe-worker".to_string())
            .spawn(move || {
                rt.block_on(async {
                    if let Err(err) =
                        run_async_worker(network, timeout, cmd_rx, evt_tx.clone()).await
                    {
                        let _ = evt_tx.send(RuntimeEvent::Error {
                            message: format!("Worker exited: {:#}", err),
                        });
                    }
                });
            })
            .context("Failed to spawn worker thread")?;

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
