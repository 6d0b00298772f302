//! Configuration for contract-ledger networks.

use alloy_primitives::B256;
use corridor_types::config::LiteralOrEnv;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use url::Url;

/// Per-network configuration for an EVM-compatible contract ledger.
///
/// `rpc` and `signer` accept `$VAR` / `${VAR}` environment references so keys
/// and keyed endpoints stay out of the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvmLedgerConfig {
    /// EIP-155 chain id; the signer is bound to it so transactions cannot be
    /// replayed across chains.
    pub chain_id: u64,
    pub rpc: LiteralOrEnv<Url>,
    pub signer: LiteralOrEnv<EvmPrivateKey>,
    /// Whether the chain supports EIP-1559 gas pricing. When false the
    /// adapter fetches a legacy gas price per transaction.
    #[serde(default = "evm_ledger_config::default_eip1559")]
    pub eip1559: bool,
    /// How long to wait for the transaction receipt.
    #[serde(default = "evm_ledger_config::default_receipt_timeout_secs")]
    pub receipt_timeout_secs: u64,
    /// Block confirmations to require before treating a transfer as settled.
    #[serde(default = "evm_ledger_config::default_confirmations")]
    pub confirmations: u64,
}

mod evm_ledger_config {
    pub fn default_eip1559() -> bool {
        true
    }
    pub fn default_receipt_timeout_secs() -> u64 {
        30
    }
    pub fn default_confirmations() -> u64 {
        1
    }
}

/// A validated EVM private key (32 bytes, hex, 0x-prefixed).
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct EvmPrivateKey(B256);

impl EvmPrivateKey {
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_ref()
    }
}

impl PartialEq for EvmPrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl FromStr for EvmPrivateKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        B256::from_str(s)
            .map(Self)
            .map_err(|e| format!("Invalid evm private key: {}", e))
    }
}
