//! Per-network cost estimation.
//!
//! Pure arithmetic over the registry's configured fees; no adapter or ledger
//! access. Estimates come back in the same candidate order routing would use,
//! so the first entry is the network the router would try first, not
//! necessarily the cheapest.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::registry::NetworkRegistry;
use corridor_types::network::{NetworkId, TokenSymbol};

/// Estimated cost of settling one transfer on one candidate network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub network: NetworkId,
    /// Configured per-transfer fee, token units.
    pub fee: Decimal,
    /// `amount + fee`.
    pub total_cost: Decimal,
    /// How much cheaper this network is than the costliest candidate. Zero
    /// for the costliest candidate itself.
    pub savings_vs_most_expensive: Decimal,
}

/// Prices `amount` of `symbol` on every routing candidate.
///
/// Unsupported symbols yield an empty vec, mirroring
/// [`NetworkRegistry::candidates_for`].
pub fn estimate_costs(
    registry: &NetworkRegistry,
    symbol: &TokenSymbol,
    amount: Decimal,
) -> Vec<CostEstimate> {
    let candidates = registry.candidates_for(symbol);
    let totals: Vec<Decimal> = candidates
        .iter()
        .map(|c| amount + c.network.fee)
        .collect();
    let max_total = totals.iter().copied().max().unwrap_or(Decimal::ZERO);
    candidates
        .iter()
        .zip(totals)
        .map(|(candidate, total_cost)| CostEstimate {
            network: candidate.network.id.clone(),
            fee: candidate.network.fee,
            total_cost,
            savings_vs_most_expensive: max_total - total_cost,
        })
        .collect()
}
