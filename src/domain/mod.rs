//! Domain models for network probing
//!
//! This module holds the network registry, address/unit helpers and the
//! probe state machine, independent of the RPC transport (alloy) and the TUI.

pub mod address;
pub mod network;
pub mod probe;
pub mod units;

pub use address::parse_address_input;
pub use network::NetworkId;
pub use probe::{Field, ProbeState, ProbeStatus, ProbeWorkflow};
