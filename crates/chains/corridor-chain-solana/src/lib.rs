//! Account-ledger adapter: SPL token settlement on Solana-style chains.
//!
//! One [`SolanaChainAdapter`] is constructed per configured account-ledger
//! network. It derives associated token accounts for the operator and the
//! recipient, builds a `transfer_checked` instruction (plus an optional memo),
//! signs with the operator keypair, and submits with a bounded internal retry
//! before waiting for confirmed commitment.

pub mod adapter;
pub mod config;

pub use adapter::SolanaChainAdapter;
pub use config::{SolanaLedgerConfig, SolanaPrivateKey};
