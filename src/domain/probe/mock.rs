//! In-memory chain client for probe tests

use std::sync::atomic::{AtomicUsize, Ordering};

use alloy::primitives::{Address, U256};
use anyhow::{anyhow, Result};
use tokio::sync::Semaphore;

use crate::infrastructure::ethereum::ChainClient;

pub(crate) struct MockClient {
    chain_id: Result<u64, String>,
    block_number: Result<u64, String>,
    balance: Result<U256, String>,
    /// When set, `block_number` waits for a permit before answering
    gate: Option<Semaphore>,
    hang_block_number: bool,
    hang_balance: bool,
    pub balance_calls: AtomicUsize,
}

impl MockClient {
    pub fn new(chain_id: u64, block_number: u64) -> Self {
        Self {
            chain_id: Ok(chain_id),
            block_number: Ok(block_number),
            balance: Ok(U256::ZERO),
            gate: None,
            hang_block_number: false,
            hang_balance: false,
            balance_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_balance(mut self, wei: U256) -> Self {
        self.balance = Ok(wei);
        self
    }

    pub fn failing_block_number(mut self, message: &str) -> Self {
        self.block_number = Err(message.to_string());
        self
    }

    pub fn failing_balance(mut self, message: &str) -> Self {
        self.balance = Err(message.to_string());
        self
    }

    pub fn gated(mut self) -> Self {
        self.gate = Some(Semaphore::new(0));
        self
    }

    pub fn hanging(mut self) -> Self {
        self.hang_block_number = true;
        self
    }

    /// Chain id and block answer, the balance read never does
    pub fn hanging_balance(mut self) -> Self {
        self.hang_balance = true;
        self
    }

    /// Let one gated `block_number` call through
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }
}

#[async_trait::async_trait]
impl ChainClient for MockClient {
    async fn chain_id(&self) -> Result<u64> {
        self.chain_id.clone().map_err(|msg| anyhow!(msg))
    }

    async fn block_number(&self) -> Result<u64> {
        if self.hang_block_number {
            std::future::pending::<()>().await;
        }
        if let Some(gate) = &self.gate {
            gate.acquire().await?.forget();
        }
        self.block_number.clone().map_err(|msg| anyhow!(msg))
    }

    async fn balance(&self, _address: Address) -> Result<U256> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        if self.hang_balance {
            std::future::pending::<()>().await;
        }
        self.balance.clone().map_err(|msg| anyhow!(msg))
    }

    fn endpoint(&self) -> &str {
        "mock://chain"
    }
}
