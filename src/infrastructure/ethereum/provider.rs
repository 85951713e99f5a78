//! Chain client abstraction and its Alloy HTTP implementation

use alloy::network::Ethereum;
use alloy::primitives::{Address, U256};
use alloy::providers::{
    fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
    Identity, Provider, ProviderBuilder, RootProvider,
};
use anyhow::{Context, Result};

/// Read-only chain operations needed by a probe
///
/// Implementations are stateless apart from their endpoint, so one client can
/// be shared by concurrent probes.
#[async_trait::async_trait]
pub trait ChainClient: Send + Sync + 'static {
    /// Chain id reported by the node (`eth_chainId`)
    async fn chain_id(&self) -> Result<u64>;

    /// Latest block number (`eth_blockNumber`)
    async fn block_number(&self) -> Result<u64>;

    /// Native balance in wei (`eth_getBalance` at latest)
    async fn balance(&self, address: Address) -> Result<U256>;

    /// Endpoint display name
    fn endpoint(&self) -> &str;
}

type HttpFillProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider,
    Ethereum,
>;

/// HTTP JSON-RPC client bound to one endpoint
pub struct AlloyClient {
    provider: HttpFillProvider,
    endpoint: String,
}

/// Create a client for an HTTP JSON-RPC endpoint
pub fn create_client(url: &str) -> Result<Box<dyn ChainClient>> {
    let rpc_url = url.parse().context("Invalid HTTP URL")?;
    let provider = ProviderBuilder::new().connect_http(rpc_url);
    Ok(Box::new(AlloyClient {
        provider,
        endpoint: url.to_string(),
    }))
}

#[async_trait::async_trait]
impl ChainClient for AlloyClient {
    async fn chain_id(&self) -> Result<u64> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn block_number(&self) -> Result<u64> {
        Ok(self.provider.get_block_number().await?)
    }

    async fn balance(&self, address: Address) -> Result<U256> {
        Ok(self.provider.get_balance(address).await?)
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
