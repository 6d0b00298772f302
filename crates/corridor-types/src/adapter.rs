//! The ledger adapter boundary.

use crate::network::{NetworkFamily, NetworkId, TokenInfo};
use crate::transfer::{TransferOutcome, TransferRequest};

/// One concrete ledger integration.
///
/// Adapters are constructed once per configured network at startup; a missing
/// endpoint or malformed operator key is a construction error, never a
/// per-request one. `transfer` must normalize every ledger-library error into
/// a failed [`TransferOutcome`] — nothing else crosses this boundary, which is
/// what lets the router iterate candidates without caring about family
/// internals.
#[async_trait::async_trait]
pub trait ChainAdapter: Send + Sync {
    /// The network this adapter settles on.
    fn network_id(&self) -> &NetworkId;

    /// Ledger family, informational.
    fn family(&self) -> NetworkFamily;

    /// The operator treasury address funds are sent from, in the ledger's
    /// native display format.
    fn operator_address(&self) -> String;

    /// Execute one settlement attempt end to end: validate, balance-check,
    /// submit, and wait for confirmation.
    async fn transfer(&self, token: &TokenInfo, request: &TransferRequest) -> TransferOutcome;
}
