//! Contract-ledger adapter: ERC-20 settlement on EVM-compatible chains.
//!
//! One [`EvmChainAdapter`] is constructed per configured contract-ledger
//! network. It signs ERC-20 `transfer` calls with the operator key, supports
//! both EIP-1559 and legacy gas pricing, and bounds receipt waits with a
//! per-network timeout.

pub mod adapter;
pub mod config;
pub mod erc20;

pub use adapter::EvmChainAdapter;
pub use config::{EvmLedgerConfig, EvmPrivateKey};
