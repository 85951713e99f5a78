//! RPC reads performed by one probe

use std::time::Duration;

use alloy::primitives::{Address, U256};
use futures::future::try_join;

use super::ProbeError;
use crate::infrastructure::ethereum::ChainClient;

/// Values collected by one successful probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub chain_id: u64,
    pub block_number: u64,
    /// `None` when no valid address was supplied
    pub balance_wei: Option<U256>,
}

/// Run the probe reads against `client`.
///
/// Chain id and block number are fetched concurrently and must both succeed.
/// The balance read only happens for a valid address, after the first two.
pub async fn execute_probe(
    client: &dyn ChainClient,
    address: Option<Address>,
) -> Result<ProbeReport, ProbeError> {
    let chain_id = async {
        client
            .chain_id()
            .await
            .map_err(|err| ProbeError::rpc("eth_chainId", err))
    };
    let block_number = async {
        client
            .block_number()
            .await
            .map_err(|err| ProbeError::rpc("eth_blockNumber", err))
    };
    let (chain_id, block_number) = try_join(chain_id, block_number).await?;

    let balance_wei = match address {
        Some(address) => Some(
            client
                .balance(address)
                .await
                .map_err(|err| ProbeError::rpc("eth_getBalance", err))?,
        ),
        None => None,
    };

    Ok(ProbeReport {
        chain_id,
        block_number,
        balance_wei,
    })
}

/// [`execute_probe`] bounded by `timeout`; running out of time is a failure
pub async fn execute_with_timeout(
    client: &dyn ChainClient,
    address: Option<Address>,
    timeout: Duration,
) -> Result<ProbeReport, ProbeError> {
    tokio::time::timeout(timeout, execute_probe(client, address))
        .await
        .map_err(|_| ProbeError::Timeout { after: timeout })?
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::domain::probe::mock::MockClient;

    fn some_address() -> Address {
        "0x00000000000000000000000000000000000000aa".parse().unwrap()
    }

    #[tokio::test]
    async fn test_no_address_skips_balance() {
        let client = MockClient::new(84532, 1000);
        let report = execute_probe(&client, None).await.unwrap();
        assert_eq!(
            report,
            ProbeReport {
                chain_id: 84532,
                block_number: 1000,
                balance_wei: None,
            }
        );
        assert_eq!(client.balance_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_balance_is_read_for_address() {
        let client = MockClient::new(84532, 1000).with_balance(U256::from(7u64));
        let report = execute_probe(&client, Some(some_address())).await.unwrap();
        assert_eq!(report.balance_wei, Some(U256::from(7u64)));
        assert_eq!(client.balance_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_block_failure_fails_probe_before_balance() {
        let client = MockClient::new(84532, 1000).failing_block_number("connection refused");
        let err = execute_probe(&client, Some(some_address()))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ProbeError::Rpc {
                operation: "eth_blockNumber",
                message: "connection refused".to_string(),
            }
        );
        assert_eq!(client.balance_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_balance_failure_fails_probe() {
        let client = MockClient::new(84532, 1000).failing_balance("bad response");
        let err = execute_probe(&client, Some(some_address()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProbeError::Rpc {
                operation: "eth_getBalance",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_timeout() {
        let client = MockClient::new(84532, 1000).hanging();
        let timeout = Duration::from_millis(50);
        let err = execute_with_timeout(&client, None, timeout)
            .await
            .unwrap_err();
        assert_eq!(err, ProbeError::Timeout { after: timeout });
        assert_eq!(err.to_string(), "probe timed out after 50ms");
    }

    #[tokio::test]
    async fn test_timeout_covers_balance_read() {
        let client = MockClient::new(84532, 1000).hanging_balance();
        let timeout = Duration::from_millis(50);

        let err = execute_with_timeout(&client, Some(some_address()), timeout)
            .await
            .unwrap_err();

        assert_eq!(err, ProbeError::Timeout { after: timeout });
        assert_eq!(client.balance_calls.load(Ordering::SeqCst), 1);

        let report = execute_with_timeout(&client, None, timeout).await.unwrap();
        assert_eq!(report.balance_wei, None);
    }
}
