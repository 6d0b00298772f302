//! Network and token catalog types.
//!
//! A *network* is a distributed ledger a settlement can be routed over. Two
//! families exist: contract ledgers (EVM-style chains where tokens are smart
//! contracts) and account ledgers (Solana-style chains where tokens are mint
//! accounts). Every network carries an operator-assigned routing priority and
//! an informational per-transfer fee used by the cost estimator.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use url::Url;

/// Globally unique identifier of a settlement network, e.g. `"base"` or
/// `"solana"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkId(String);

impl NetworkId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NetworkId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NetworkId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<&str> for NetworkId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Token ticker symbol, e.g. `"USDC"`. Comparison is case-sensitive; configs
/// are expected to use the canonical uppercase form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSymbol(String);

impl TokenSymbol {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TokenSymbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TokenSymbol {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The two ledger families Corridor can settle over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkFamily {
    /// EVM-style ledgers where tokens live in smart contracts.
    #[serde(rename = "contract-ledger")]
    ContractLedger,
    /// Solana-style ledgers where tokens live in mint/token accounts.
    #[serde(rename = "account-ledger")]
    AccountLedger,
}

impl Display for NetworkFamily {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkFamily::ContractLedger => write!(f, "contract-ledger"),
            NetworkFamily::AccountLedger => write!(f, "account-ledger"),
        }
    }
}

/// Family-specific connection data for a network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionInfo {
    ContractLedger { endpoint: Url, chain_id: u64 },
    AccountLedger { consensus_id: String },
}

/// A settlement network as known to the registry.
///
/// `priority` orders routing candidates ascending; ties are broken by `id` so
/// candidate order is deterministic for a fixed catalog. `fee` is the
/// operator-configured per-transfer fee in token units, informational only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub id: NetworkId,
    pub family: NetworkFamily,
    pub priority: u32,
    pub fee: Decimal,
    pub enabled: bool,
    pub testnet: bool,
    pub connection: ConnectionInfo,
}

/// A token deployment on one specific network.
///
/// The same symbol may exist on several networks; each `(symbol, network)`
/// pair is a distinct deployment with its own on-ledger asset handle and
/// decimal precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub symbol: TokenSymbol,
    pub network: NetworkId,
    /// Contract address (contract ledgers) or mint address (account ledgers).
    pub asset: String,
    pub decimals: u8,
    pub enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_family_serde_uses_kebab_names() {
        let json = serde_json::to_string(&NetworkFamily::ContractLedger).unwrap();
        assert_eq!(json, "\"contract-ledger\"");
        let family: NetworkFamily = serde_json::from_str("\"account-ledger\"").unwrap();
        assert_eq!(family, NetworkFamily::AccountLedger);
    }

    #[test]
    fn network_id_is_transparent_in_json() {
        let id = NetworkId::new("base");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"base\"");
        let back: NetworkId = serde_json::from_str("\"base\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn network_ids_order_lexicographically() {
        let mut ids = vec![NetworkId::new("solana"), NetworkId::new("base")];
        ids.sort();
        assert_eq!(ids[0].as_str(), "base");
    }
}
