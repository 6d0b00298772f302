//! Core domain types for the Corridor settlement router.
//!
//! This crate defines the shared vocabulary of the workspace: the network and
//! token catalog types ([`network`]), the transfer request/outcome model
//! ([`transfer`]), the payment-order lifecycle ([`order`]), and the
//! [`adapter::ChainAdapter`] trait every ledger integration implements.
//! Supporting utilities cover decimal-to-base-unit conversion ([`amount`]),
//! environment-aware configuration values ([`config`]), stringified Unix
//! timestamps ([`timestamp`]), and the exponential backoff policy used by
//! adapter-internal retries ([`retry`]).

pub mod adapter;
pub mod amount;
pub mod config;
pub mod network;
pub mod order;
pub mod retry;
pub mod timestamp;
pub mod transfer;

pub use adapter::ChainAdapter;
pub use network::{ConnectionInfo, NetworkFamily, NetworkId, NetworkInfo, TokenInfo, TokenSymbol};
pub use order::{OrderId, OrderSettlementUpdate, OrderStatus, OrderStore, OrderStoreError};
pub use transfer::{
    AttemptFailure, RoutingError, RoutingResult, SettledTransfer, TransferFailure,
    TransferFailureKind, TransferOutcome, TransferRequest,
};
