//! Probe workflow - chain id, block height and balance reads for one network
//!
//! A probe is split into three steps so the TUI can drive it across the
//! runtime bridge: [`ProbeWorkflow::begin`] issues a sequence-numbered ticket,
//! [`execute_with_timeout`] performs the RPC reads, and [`ProbeWorkflow::complete`]
//! publishes the outcome unless a newer probe or a network switch superseded it.

mod error;
mod execute;
mod state;
mod workflow;

pub use error::ProbeError;
pub use execute::{execute_with_timeout, ProbeReport};
pub use state::{Field, ProbeState, ProbeStatus};
pub use workflow::{Completion, ProbeTicket, ProbeWorkflow};

#[cfg(test)]
pub(crate) mod mock;
