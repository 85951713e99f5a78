use std::time::{Duration, Instant};

use tracing::debug;

use crate::domain::probe::{Completion, ProbeError, ProbeReport, ProbeStatus, ProbeTicket};
use crate::domain::{parse_address_input, NetworkId, ProbeState, ProbeWorkflow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Editing the address box
    Address,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
    pub since: Instant,
}

pub struct App {
    pub workflow: ProbeWorkflow,
    /// Committed address, used by the next probe
    pub address: String,
    /// Address being typed while in `InputMode::Address`
    pub address_draft: String,
    pub input_mode: InputMode,
    pub rpc_endpoint: String,
    pub help_open: bool,
    pub should_quit: bool,
    status: Option<StatusMessage>,
    network_switch_request: Option<NetworkId>,
    probe_request: Option<ProbeTicket>,
}

impl App {
    pub fn new(network: NetworkId, address: String) -> Self {
        Self {
            workflow: ProbeWorkflow::new(network),
            address,
            address_draft: String::new(),
            input_mode: InputMode::Normal,
            rpc_endpoint: network.config().rpc_url.to_string(),
            help_open: false,
            should_quit: false,
            status: None,
            network_switch_request: None,
            probe_request: None,
        }
    }

    pub fn probe(&self) -> &ProbeState {
        self.workflow.state()
    }

    pub fn network(&self) -> NetworkId {
        self.workflow.network()
    }

    pub fn set_status(&mut self, text: impl Into<String>, level: StatusLevel) {
        self.status = Some(StatusMessage {
            text: text.into(),
            level,
            since: Instant::now(),
        });
    }

    pub fn status_text(&self) -> Option<(&str, StatusLevel)> {
        self.status
            .as_ref()
            .map(|status| (status.text.as_str(), status.level))
    }

    pub fn on_tick(&mut self) {
        if let Some(status) = self.status.as_ref() {
            // Warnings and errors stay until replaced
            if status.level == StatusLevel::Info && status.since.elapsed() > Duration::from_secs(3)
            {
                self.status = None;
            }
        }
    }

    /// Whether the committed address will be used for a balance read
    pub fn address_is_valid(&self) -> bool {
        parse_address_input(&self.address).is_some()
    }

    pub fn cycle_network(&mut self) {
        let next = self.network().next();
        if self.workflow.select_network(next) {
            self.network_switch_request = Some(next);
            self.rpc_endpoint = next.config().rpc_url.to_string();
            self.set_status(
                format!("Switched to {}", next.config().caption()),
                StatusLevel::Info,
            );
        }
    }

    pub fn trigger_probe(&mut self) {
        let ticket = self.workflow.begin(&self.address);
        self.set_status(
            format!("Probing {}…", self.workflow.config().label),
            StatusLevel::Info,
        );
        self.probe_request = Some(ticket);
    }

    pub fn enter_address(&mut self) {
        self.address_draft = self.address.clone();
        self.input_mode = InputMode::Address;
    }

    pub fn exit_address(&mut self, commit: bool) {
        if commit {
            self.address = self.address_draft.trim().to_string();
            if !self.address.is_empty() && !self.address_is_valid() {
                self.set_status(
                    "Not a 0x + 40 hex address; balance will be skipped",
                    StatusLevel::Warn,
                );
            }
        }
        self.address_draft.clear();
        self.input_mode = InputMode::Normal;
    }

    pub fn clear_address(&mut self) {
        self.address.clear();
        self.set_status("Address cleared", StatusLevel::Info);
    }

    pub fn take_network_switch_request(&mut self) -> Option<NetworkId> {
        self.network_switch_request.take()
    }

    pub fn take_probe_request(&mut self) -> Option<ProbeTicket> {
        self.probe_request.take()
    }

    pub fn apply_client_ready(&mut self, network: NetworkId, endpoint: String) {
        if network == self.network() {
            self.rpc_endpoint = endpoint;
        }
    }

    pub fn apply_probe_done(
        &mut self,
        ticket: ProbeTicket,
        outcome: Result<ProbeReport, ProbeError>,
    ) {
        if self.workflow.complete(&ticket, outcome) == Completion::Stale {
            debug!(seq = ticket.seq, "ignored superseded probe");
            return;
        }

        let state = self.workflow.state();
        let (text, level) = match (&state.status, &state.warning) {
            (ProbeStatus::Failed(message), _) => {
                (format!("Probe failed: {message}"), StatusLevel::Error)
            }
            (_, Some(warning)) => (warning.clone(), StatusLevel::Warn),
            _ => ("Finished".to_string(), StatusLevel::Info),
        };
        self.set_status(text, level);
    }

    pub fn apply_rpc_error(&mut self, message: String) {
        self.set_status(message, StatusLevel::Error);
    }

    /// The worker never received `ticket`, so settle it here
    pub fn fail_dispatch(&mut self, ticket: ProbeTicket, message: String) {
        self.apply_probe_done(
            ticket,
            Err(ProbeError::Rpc {
                operation: "dispatch",
                message,
            }),
        );
    }
}
