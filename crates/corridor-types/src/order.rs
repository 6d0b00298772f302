//! Payment order lifecycle and the order persistence boundary.
//!
//! Orders are created and owned elsewhere; the router only performs the
//! terminal `Processing -> Completed | Failed` transition through the
//! [`OrderStore`] trait. A `Completed` order is immutable: stores must reject
//! further settlement writes.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::network::NetworkId;
use crate::transfer::SettledTransfer;

/// Identifier of a payment order in the backing store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OrderId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Order lifecycle states. The router only ever writes `Completed` or
/// `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Initiated,
    Pending,
    Processing,
    Completed,
    Failed,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Failed)
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Initiated => "initiated",
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// The single settlement write the router issues against an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSettlementUpdate {
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_used: Option<NetworkId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OrderSettlementUpdate {
    pub fn completed(settled: &SettledTransfer) -> Self {
        Self {
            status: OrderStatus::Completed,
            network_used: Some(settled.network.clone()),
            tx_id: Some(settled.tx_id.clone()),
            tx_hash: settled.tx_hash.clone(),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: OrderStatus::Failed,
            network_used: None,
            tx_id: None,
            tx_hash: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrderStoreError {
    #[error("order {0} not found")]
    NotFound(OrderId),
    #[error("order {0} is already completed")]
    AlreadyCompleted(OrderId),
    #[error("order store backend error: {0}")]
    Backend(String),
}

/// Persistence boundary for order settlement write-back.
#[async_trait::async_trait]
pub trait OrderStore: Send + Sync {
    async fn update_settlement(
        &self,
        order_id: &OrderId,
        update: OrderSettlementUpdate,
    ) -> Result<(), OrderStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::UnixTimestamp;
    use rust_decimal::Decimal;

    #[test]
    fn terminal_statuses() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Failed.is_terminal());
        assert!(!OrderStatus::Processing.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Initiated.is_terminal());
    }

    #[test]
    fn completed_update_copies_settlement_evidence() {
        let settled = SettledTransfer {
            network: NetworkId::new("solana"),
            tx_id: "5Gq".to_string(),
            tx_hash: None,
            fee_paid: Decimal::from(5000),
            timestamp: UnixTimestamp::from_secs(1_700_000_000),
        };
        let update = OrderSettlementUpdate::completed(&settled);
        assert_eq!(update.status, OrderStatus::Completed);
        assert_eq!(update.network_used, Some(NetworkId::new("solana")));
        assert_eq!(update.tx_id.as_deref(), Some("5Gq"));
        assert!(update.error.is_none());
    }
}
