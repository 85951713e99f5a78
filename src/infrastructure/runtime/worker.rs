//! Async worker - runs in Tokio runtime and handles RPC operations

use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};

use crate::domain::probe::execute_with_timeout;
use crate::domain::NetworkId;
use crate::infrastructure::ethereum::{create_client, ChainClient};
use crate::infrastructure::runtime::bridge::{RuntimeCommand, RuntimeEvent};

/// Run the async worker loop
///
/// Holds one client for the selected network. Probes run as separate tasks
/// so a new trigger never waits on an outstanding one; the TUI decides which
/// outcome is still current.
pub async fn run_async_worker(
    network: NetworkId,
    timeout: Duration,
    mut cmd_rx: UnboundedReceiver<RuntimeCommand>,
    evt_tx: Sender<RuntimeEvent>,
) -> Result<()> {
    let mut network = network;
    let mut client = connect(network, &evt_tx)?;

    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            RuntimeCommand::Shutdown => return Ok(()),

            RuntimeCommand::SelectNetwork { network: next } => {
                if next != network {
                    client = connect(next, &evt_tx)?;
                    network = next;
                }
            }

            RuntimeCommand::Probe { ticket } => {
                if ticket.network != network {
                    client = connect(ticket.network, &evt_tx)?;
                    network = ticket.network;
                }

                let client = Arc::clone(&client);
                let evt_tx = evt_tx.clone();
                debug!(seq = ticket.seq, endpoint = client.endpoint(), "dispatching probe");
                tokio::spawn(async move {
                    let outcome = execute_with_timeout(client.as_ref(), ticket.address, timeout).await;
                    let _ = evt_tx.send(RuntimeEvent::ProbeDone { ticket, outcome });
                });
            }
        }
    }

    Ok(())
}

fn connect(network: NetworkId, evt_tx: &Sender<RuntimeEvent>) -> Result<Arc<dyn ChainClient>> {
    let config = network.config();
    let client: Arc<dyn ChainClient> = Arc::from(create_client(config.rpc_url)?);
    info!(network = %network, endpoint = config.rpc_url, "chain client ready");
    let _ = evt_tx.send(RuntimeEvent::ClientReady {
        network,
        endpoint: client.endpoint().to_string(),
    });
    Ok(client)
}
