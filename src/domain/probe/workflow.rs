//! Probe sequencing and publication

use std::time::Duration;

use alloy::primitives::Address;
use chrono::Local;
use tracing::{debug, info, warn};

use super::execute::{execute_with_timeout, ProbeReport};
use super::state::{Field, ProbeState, ProbeStatus};
use super::ProbeError;
use crate::domain::address::parse_address_input;
use crate::domain::network::{NetworkConfig, NetworkId};
use crate::infrastructure::ethereum::ChainClient;

/// Handle for one probe invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTicket {
    pub seq: u64,
    pub network: NetworkId,
    /// Parsed address, `None` if the input was empty or malformed
    pub address: Option<Address>,
}

/// What [`ProbeWorkflow::complete`] did with an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Published,
    /// Superseded by a newer probe or a network switch; nothing changed
    Stale,
}

/// Owns the probe state for the selected network.
///
/// Every [`begin`](Self::begin) and every network switch advances the
/// sequence number; only the outcome carrying the latest sequence number for
/// the current network is ever published.
#[derive(Debug)]
pub struct ProbeWorkflow {
    state: ProbeState,
    latest_seq: u64,
}

impl ProbeWorkflow {
    pub fn new(network: NetworkId) -> Self {
        Self {
            state: ProbeState::new(network),
            latest_seq: 0,
        }
    }

    pub fn state(&self) -> &ProbeState {
        &self.state
    }

    pub fn network(&self) -> NetworkId {
        self.state.network
    }

    pub fn config(&self) -> &'static NetworkConfig {
        self.state.network.config()
    }

    pub fn is_running(&self) -> bool {
        self.state.status == ProbeStatus::Running
    }

    /// Switch networks. Results shown so far belong to the old network, so
    /// the snapshot is reset and any in-flight probe becomes stale.
    pub fn select_network(&mut self, network: NetworkId) -> bool {
        if network == self.state.network {
            return false;
        }
        self.latest_seq += 1;
        self.state = ProbeState::new(network);
        info!(network = %network, seq = self.latest_seq, "network selected");
        true
    }

    /// Start a probe: issue a ticket and move to Running
    pub fn begin(&mut self, address_input: &str) -> ProbeTicket {
        self.latest_seq += 1;
        let ticket = ProbeTicket {
            seq: self.latest_seq,
            network: self.state.network,
            address: parse_address_input(address_input),
        };

        self.state.status = ProbeStatus::Running;
        self.state.observed_chain_id.mark_pending();
        self.state.latest_block.mark_pending();
        self.state.balance_wei.mark_pending();

        debug!(
            network = %ticket.network,
            seq = ticket.seq,
            has_address = ticket.address.is_some(),
            "probe started"
        );
        ticket
    }

    /// Publish the outcome of `ticket` unless it has been superseded
    pub fn complete(
        &mut self,
        ticket: &ProbeTicket,
        outcome: Result<ProbeReport, ProbeError>,
    ) -> Completion {
        if ticket.seq != self.latest_seq || ticket.network != self.state.network {
            debug!(
                network = %ticket.network,
                seq = ticket.seq,
                latest = self.latest_seq,
                "discarding stale probe result"
            );
            return Completion::Stale;
        }

        match outcome {
            Ok(report) => self.publish(ticket, report),
            Err(err) => self.fail(ticket, err),
        }
        self.state.finished_at = Some(Local::now());
        Completion::Published
    }

    /// Run one complete probe against `client` and return the new snapshot
    pub async fn run(
        &mut self,
        client: &dyn ChainClient,
        address_input: &str,
        timeout: Duration,
    ) -> &ProbeState {
        let ticket = self.begin(address_input);
        let outcome = execute_with_timeout(client, ticket.address, timeout).await;
        self.complete(&ticket, outcome);
        &self.state
    }

    fn publish(&mut self, ticket: &ProbeTicket, report: ProbeReport) {
        let expected = self.state.expected_chain_id();
        let label = self.config().label;
        self.state.warning = (report.chain_id != expected).then(|| {
            format!(
                "RPC reports chain id {} but {} is {}",
                report.chain_id, label, expected
            )
        });
        if let Some(warning) = &self.state.warning {
            warn!(network = %ticket.network, seq = ticket.seq, "{warning}");
        }

        self.state.status = ProbeStatus::Finished;
        self.state.observed_chain_id = Field::Value(report.chain_id);
        self.state.latest_block = Field::Value(report.block_number);
        self.state.balance_wei = Field::Value(report.balance_wei);
        self.state.address = ticket.address;

        info!(
            network = %ticket.network,
            seq = ticket.seq,
            chain_id = report.chain_id,
            block = report.block_number,
            "probe finished"
        );
    }

    fn fail(&mut self, ticket: &ProbeTicket, err: ProbeError) {
        let reason = err.to_string();
        warn!(network = %ticket.network, seq = ticket.seq, error = %reason, "probe failed");

        self.state.observed_chain_id.mark_failed(&reason);
        self.state.latest_block.mark_failed(&reason);
        self.state.balance_wei.mark_failed(&reason);
        self.state.status = ProbeStatus::Failed(reason);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use alloy::primitives::U256;

    use super::*;
    use crate::domain::probe::execute::execute_probe;
    use crate::domain::probe::mock::MockClient;
    use crate::domain::units::render_balance;

    const TIMEOUT: Duration = Duration::from_secs(5);
    const ADDRESS: &str = "0xAbC1230000000000000000000000000000dEf456";

    #[tokio::test]
    async fn test_probe_without_address() {
        let client = MockClient::new(84532, 1000);
        let mut workflow = ProbeWorkflow::new(NetworkId::BaseSepolia);

        let state = workflow.run(&client, "", TIMEOUT).await;

        assert_eq!(state.status, ProbeStatus::Finished);
        assert_eq!(state.observed_chain_id, Field::Value(84532));
        assert_eq!(state.latest_block, Field::Value(1000));
        assert_eq!(state.balance_wei, Field::Value(None));
        assert_eq!(state.warning, None);
        assert!(state.finished_at.is_some());
    }

    #[tokio::test]
    async fn test_probe_with_address_renders_balance() {
        let client = MockClient::new(84532, 1000)
            .with_balance(U256::from(2_500_000_000_000_000_000u64));
        let mut workflow = ProbeWorkflow::new(NetworkId::BaseSepolia);

        let state = workflow.run(&client, ADDRESS, TIMEOUT).await;

        let wei = state.balance_wei.value().copied().flatten().unwrap();
        assert_eq!(render_balance(wei), "2.5 ETH");
        assert_eq!(state.balance_text(), "2.5 ETH");
        assert!(state.address.is_some());
    }

    #[tokio::test]
    async fn test_invalid_address_clears_balance() {
        let funded = MockClient::new(84532, 1000).with_balance(U256::from(5u64));
        let mut workflow = ProbeWorkflow::new(NetworkId::BaseSepolia);
        workflow.run(&funded, ADDRESS, TIMEOUT).await;
        assert_eq!(
            workflow.state().balance_wei,
            Field::Value(Some(U256::from(5u64)))
        );

        let state = workflow.run(&funded, "not-an-address", TIMEOUT).await;
        assert_eq!(state.status, ProbeStatus::Finished);
        assert_eq!(state.balance_wei, Field::Value(None));
        assert_eq!(state.address, None);
    }

    #[tokio::test]
    async fn test_failure_keeps_last_good_values() {
        let healthy = MockClient::new(84532, 1000);
        let mut workflow = ProbeWorkflow::new(NetworkId::BaseSepolia);
        workflow.run(&healthy, "", TIMEOUT).await;

        let broken = MockClient::new(84532, 2000).failing_block_number("connection reset");
        let state = workflow.run(&broken, "", TIMEOUT).await;

        assert_eq!(
            state.status,
            ProbeStatus::Failed("eth_blockNumber failed: connection reset".to_string())
        );
        assert_eq!(state.observed_chain_id, Field::Value(84532));
        assert_eq!(state.latest_block, Field::Value(1000));
    }

    #[tokio::test]
    async fn test_first_probe_failure_marks_fields_failed() {
        let broken = MockClient::new(84532, 1000).failing_block_number("connection reset");
        let mut workflow = ProbeWorkflow::new(NetworkId::BaseSepolia);

        let state = workflow.run(&broken, "", TIMEOUT).await;

        assert_eq!(state.status.label(), "Failed");
        assert!(matches!(state.latest_block, Field::Failed(_)));
        assert!(matches!(state.observed_chain_id, Field::Failed(_)));
        assert_eq!(state.block_text(), "failed");
    }

    #[tokio::test]
    async fn test_chain_mismatch_warns() {
        let wrong_chain = MockClient::new(8453, 1000);
        let mut workflow = ProbeWorkflow::new(NetworkId::BaseSepolia);

        let state = workflow.run(&wrong_chain, "", TIMEOUT).await;

        assert_eq!(state.status, ProbeStatus::Finished);
        let warning = state.warning.as_deref().unwrap();
        assert!(warning.contains("8453"));
        assert!(warning.contains("84532"));

        let right_chain = MockClient::new(84532, 1001);
        let state = workflow.run(&right_chain, "", TIMEOUT).await;
        assert_eq!(state.warning, None);
    }

    #[test]
    fn test_begin_marks_running() {
        let mut workflow = ProbeWorkflow::new(NetworkId::Base);
        let ticket = workflow.begin(&format!("  {ADDRESS} "));

        assert!(workflow.is_running());
        assert_eq!(ticket.network, NetworkId::Base);
        assert!(ticket.address.is_some());
        assert_eq!(workflow.state().latest_block, Field::Pending);
    }

    #[tokio::test]
    async fn test_network_switch_discards_in_flight_result() {
        let mut workflow = ProbeWorkflow::new(NetworkId::BaseSepolia);
        let sepolia = Arc::new(MockClient::new(84532, 1000).gated());

        let ticket = workflow.begin("");
        let in_flight = {
            let client = Arc::clone(&sepolia);
            tokio::spawn(async move { execute_probe(client.as_ref(), None).await })
        };

        assert!(workflow.select_network(NetworkId::Base));
        assert_eq!(workflow.state().status, ProbeStatus::Idle);

        sepolia.release();
        let outcome = in_flight.await.unwrap();
        assert!(outcome.is_ok());

        assert_eq!(workflow.complete(&ticket, outcome), Completion::Stale);
        assert_eq!(workflow.network(), NetworkId::Base);
        assert_eq!(workflow.state().status, ProbeStatus::Idle);
        assert_eq!(workflow.state().latest_block, Field::NotRun);
    }

    #[tokio::test]
    async fn test_overlapping_probes_publish_latest_only() {
        let mut workflow = ProbeWorkflow::new(NetworkId::BaseSepolia);
        let slow = Arc::new(MockClient::new(84532, 1000).gated());
        let fast = MockClient::new(84532, 1001);

        let first = workflow.begin("");
        let first_run = {
            let client = Arc::clone(&slow);
            tokio::spawn(async move { execute_probe(client.as_ref(), None).await })
        };

        let second = workflow.begin("");
        let outcome = execute_probe(&fast, None).await;
        assert_eq!(workflow.complete(&second, outcome), Completion::Published);

        slow.release();
        let outcome = first_run.await.unwrap();
        assert_eq!(workflow.complete(&first, outcome), Completion::Stale);

        assert_eq!(workflow.state().latest_block, Field::Value(1001));
        assert_eq!(workflow.state().status, ProbeStatus::Finished);
    }

    #[test]
    fn test_selecting_same_network_is_noop() {
        let mut workflow = ProbeWorkflow::new(NetworkId::BaseSepolia);
        let ticket = workflow.begin("");
        assert!(!workflow.select_network(NetworkId::BaseSepolia));

        let report = ProbeReport {
            chain_id: 84532,
            block_number: 5,
            balance_wei: None,
        };
        assert_eq!(workflow.complete(&ticket, Ok(report)), Completion::Published);
    }
}
