//! Network registry - the fixed set of networks that can be probed

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Identifier of a supported network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum, Serialize, Deserialize)]
pub enum NetworkId {
    #[default]
    #[value(name = "baseSepolia")]
    #[serde(rename = "baseSepolia")]
    BaseSepolia,
    #[value(name = "base")]
    #[serde(rename = "base")]
    Base,
}

/// Static description of one network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub id: NetworkId,
    pub rpc_url: &'static str,
    pub chain_id: u64,
    pub explorer_url: &'static str,
    pub label: &'static str,
}

const BASE_SEPOLIA: NetworkConfig = NetworkConfig {
    id: NetworkId::BaseSepolia,
    rpc_url: "https://sepolia.base.org",
    chain_id: 84532,
    explorer_url: "https://sepolia.basescan.org",
    label: "Base Sepolia",
};

const BASE: NetworkConfig = NetworkConfig {
    id: NetworkId::Base,
    rpc_url: "https://mainnet.base.org",
    chain_id: 8453,
    explorer_url: "https://basescan.org",
    label: "Base Mainnet",
};

impl NetworkId {
    pub const ALL: [NetworkId; 2] = [NetworkId::BaseSepolia, NetworkId::Base];

    /// Look up the registry entry for this network
    pub fn config(self) -> &'static NetworkConfig {
        match self {
            NetworkId::BaseSepolia => &BASE_SEPOLIA,
            NetworkId::Base => &BASE,
        }
    }

    /// Name used on the command line, in the config file and in JSON output
    pub fn as_str(self) -> &'static str {
        match self {
            NetworkId::BaseSepolia => "baseSepolia",
            NetworkId::Base => "base",
        }
    }

    /// Next network in selector order (wraps around)
    pub fn next(self) -> NetworkId {
        match self {
            NetworkId::BaseSepolia => NetworkId::Base,
            NetworkId::Base => NetworkId::BaseSepolia,
        }
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl NetworkConfig {
    /// Selector caption, e.g. "Base Sepolia (84532)"
    pub fn caption(&self) -> String {
        format!("{} ({})", self.label, self.chain_id)
    }

    /// Explorer page for an address on this network
    pub fn explorer_address_url(&self, address: &str) -> String {
        format!("{}/address/{}", self.explorer_url, address)
    }
}
