use std::time::Duration;

use thiserror::Error;

/// Why a probe failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// An RPC read failed (transport error or malformed response)
    #[error("{operation} failed: {message}")]
    Rpc {
        operation: &'static str,
        message: String,
    },

    /// The reads did not finish within the configured timeout
    #[error("probe timed out after {}ms", after.as_millis())]
    Timeout { after: Duration },
}

impl ProbeError {
    pub fn rpc(operation: &'static str, err: anyhow::Error) -> Self {
        ProbeError::Rpc {
            operation,
            message: format!("{:#}", err),
        }
    }
}
