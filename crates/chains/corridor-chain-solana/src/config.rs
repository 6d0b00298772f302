//! Configuration for account-ledger networks.

use corridor_types::config::LiteralOrEnv;
use corridor_types::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use url::Url;

/// Per-network configuration for a Solana-style account ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolanaLedgerConfig {
    /// Consensus network identifier, e.g. `"mainnet-beta"` or a genesis hash
    /// prefix. Informational, surfaced in the network catalog.
    pub consensus_id: String,
    pub rpc: LiteralOrEnv<Url>,
    /// Operator keypair, base58, 64-byte standard Solana format.
    pub signer: LiteralOrEnv<SolanaPrivateKey>,
    /// How long to wait for confirmed commitment after submission.
    #[serde(default = "solana_ledger_config::default_confirm_timeout_secs")]
    pub confirm_timeout_secs: u64,
    /// Backoff policy for transient submission failures.
    #[serde(default)]
    pub retry: RetryPolicy,
}

mod solana_ledger_config {
    pub fn default_confirm_timeout_secs() -> u64 {
        30
    }
}

/// A validated Solana private key (64 bytes in standard Solana format).
///
/// First 32 bytes: the Ed25519 secret key (seed); last 32 bytes: the public
/// key. Stored and parsed as base58, the format used by the Solana CLI and
/// wallets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolanaPrivateKey([u8; 64]);

impl SolanaPrivateKey {
    pub fn from_base58(s: &str) -> Result<Self, String> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| format!("Invalid base58: {}", e))?;

        if bytes.len() != 64 {
            return Err(format!(
                "Private key must be 64 bytes (standard Solana format), got {} bytes",
                bytes.len()
            ));
        }

        let mut arr = [0u8; 64];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(&self.0).into_string()
    }
}

impl Serialize for SolanaPrivateKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_base58())
    }
}

impl FromStr for SolanaPrivateKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

impl std::fmt::Display for SolanaPrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_base58())
    }
}
