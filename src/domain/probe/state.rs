//! Observable probe state

use alloy::primitives::{Address, U256};
use chrono::{DateTime, Local};
use serde::Serialize;

use crate::domain::network::NetworkId;
use crate::domain::units::render_balance;

/// Overall status of the most recent probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeStatus {
    Idle,
    Running,
    Finished,
    Failed(String),
}

impl ProbeStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ProbeStatus::Idle => "Idle",
            ProbeStatus::Running => "Running",
            ProbeStatus::Finished => "Finished",
            ProbeStatus::Failed(_) => "Failed",
        }
    }
}

/// One probed value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    /// No probe has produced this value yet
    NotRun,
    /// A probe is in flight and there is no earlier value to show
    Pending,
    Value(T),
    Failed(String),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::NotRun
    }
}

impl<T> Field<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Field::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Render for display; `f` formats a present value
    pub fn render(&self, f: impl FnOnce(&T) -> String) -> String {
        match self {
            Field::NotRun => "not run".to_string(),
            Field::Pending => "pending…".to_string(),
            Field::Value(value) => f(value),
            Field::Failed(_) => "failed".to_string(),
        }
    }

    /// A running probe keeps the last good value on screen
    pub(crate) fn mark_pending(&mut self) {
        if !matches!(self, Field::Value(_)) {
            *self = Field::Pending;
        }
    }

    pub(crate) fn mark_failed(&mut self, reason: &str) {
        if matches!(self, Field::Pending) {
            *self = Field::Failed(reason.to_string());
        }
    }
}

/// Snapshot of everything the probe has published for the selected network
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeState {
    pub network: NetworkId,
    pub status: ProbeStatus,
    pub observed_chain_id: Field<u64>,
    pub latest_block: Field<u64>,
    /// `Value(None)` means no valid address was given
    pub balance_wei: Field<Option<U256>>,
    /// Address the published balance belongs to
    pub address: Option<Address>,
    /// Set when the RPC reports a chain id other than the registry's
    pub warning: Option<String>,
    pub finished_at: Option<DateTime<Local>>,
}

impl ProbeState {
    pub fn new(network: NetworkId) -> Self {
        Self {
            network,
            status: ProbeStatus::Idle,
            observed_chain_id: Field::NotRun,
            latest_block: Field::NotRun,
            balance_wei: Field::NotRun,
            address: None,
            warning: None,
            finished_at: None,
        }
    }

    pub fn expected_chain_id(&self) -> u64 {
        self.network.config().chain_id
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            ProbeStatus::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn chain_id_text(&self) -> String {
        self.observed_chain_id.render(|id| id.to_string())
    }

    pub fn block_text(&self) -> String {
        self.latest_block.render(|number| number.to_string())
    }

    pub fn balance_text(&self) -> String {
        self.balance_wei.render(|balance| match balance {
            Some(wei) => render_balance(*wei),
            None => "n/a".to_string(),
        })
    }

    /// Explorer page for the probed address, or the explorer root
    pub fn explorer_link(&self) -> String {
        let config = self.network.config();
        match self.address {
            Some(address) => config.explorer_address_url(&address.to_string()),
            None => config.explorer_url.to_string(),
        }
    }

    pub fn summary(&self) -> ProbeSummary {
        let balance_wei = self.balance_wei.value().copied().flatten();
        ProbeSummary {
            network: self.network,
            chain_id: self.expected_chain_id(),
            status: self.status.label(),
            error: self.error().map(str::to_string),
            observed_chain_id: self.observed_chain_id.value().copied(),
            latest_block: self.latest_block.value().copied(),
            balance_wei: balance_wei.map(|wei| wei.to_string()),
            balance: balance_wei.map(render_balance),
            address: self.address.map(|address| address.to_string()),
            warning: self.warning.clone(),
            explorer: self.explorer_link(),
            finished_at: self.finished_at.map(|at| at.to_rfc3339()),
        }
    }
}

/// Serializable view of a [`ProbeState`] for headless output
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeSummary {
    pub network: NetworkId,
    pub chain_id: u64,
    pub status: &'static str,
    pub error: Option<String>,
    pub observed_chain_id: Option<u64>,
    pub latest_block: Option<u64>,
    pub balance_wei: Option<String>,
    pub balance: Option<String>,
    pub address: Option<String>,
    pub warning: Option<String>,
    pub explorer: String,
    pub finished_at: Option<String>,
}
