//! In-memory order store for the hosted service and tests.

use dashmap::DashMap;

use corridor_types::order::{
    OrderId, OrderSettlementUpdate, OrderStatus, OrderStore, OrderStoreError,
};

/// One order as held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub id: OrderId,
    pub status: OrderStatus,
    pub network_used: Option<corridor_types::network::NetworkId>,
    pub tx_id: Option<String>,
    pub tx_hash: Option<String>,
    pub error: Option<String>,
}

impl OrderRecord {
    /// A fresh order awaiting settlement.
    pub fn pending(id: OrderId) -> Self {
        Self {
            id,
            status: OrderStatus::Pending,
            network_used: None,
            tx_id: None,
            tx_hash: None,
            error: None,
        }
    }
}

/// Dashmap-backed [`OrderStore`].
///
/// Enforces the completed-is-immutable invariant: once an order reaches
/// `Completed`, any further settlement write is rejected.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    orders: DashMap<OrderId, OrderRecord>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: OrderRecord) {
        self.orders.insert(record.id.clone(), record);
    }

    pub fn get(&self, order_id: &OrderId) -> Option<OrderRecord> {
        self.orders.get(order_id).map(|r| r.clone())
    }
}

#[async_trait::async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn update_settlement(
        &self,
        order_id: &OrderId,
        update: OrderSettlementUpdate,
    ) -> Result<(), OrderStoreError> {
        let mut record = self
            .orders
            .get_mut(order_id)
            .ok_or_else(|| OrderStoreError::NotFound(order_id.clone()))?;
        if record.status == OrderStatus::Completed {
            return Err(OrderStoreError::AlreadyCompleted(order_id.clone()));
        }
        record.status = update.status;
        record.network_used = update.network_used;
        record.tx_id = update.tx_id;
        record.tx_hash = update.tx_hash;
        record.error = update.error;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corridor_types::network::NetworkId;
    use corridor_types::timestamp::UnixTimestamp;
    use corridor_types::transfer::SettledTransfer;
    use rust_decimal::Decimal;

    fn settled(network: &str, tx_id: &str) -> SettledTransfer {
        SettledTransfer {
            network: NetworkId::new(network),
            tx_id: tx_id.to_string(),
            tx_hash: None,
            fee_paid: Decimal::ZERO,
            timestamp: UnixTimestamp::from_secs(1_700_000_000),
        }
    }

    #[tokio::test]
    async fn completes_a_pending_order() {
        let store = InMemoryOrderStore::new();
        let id = OrderId::from("order-1");
        store.insert(OrderRecord::pending(id.clone()));

        store
            .update_settlement(&id, OrderSettlementUpdate::completed(&settled("base", "0xabc")))
            .await
            .unwrap();

        let record = store.get(&id).unwrap();
        assert_eq!(record.status, OrderStatus::Completed);
        assert_eq!(record.network_used, Some(NetworkId::new("base")));
        assert_eq!(record.tx_id.as_deref(), Some("0xabc"));
    }

    #[tokio::test]
    async fn completed_orders_are_immutable() {
        let store = InMemoryOrderStore::new();
        let id = OrderId::from("order-1");
        store.insert(OrderRecord::pending(id.clone()));
        store
            .update_settlement(&id, OrderSettlementUpdate::completed(&settled("base", "0xabc")))
            .await
            .unwrap();

        let second = store
            .update_settlement(&id, OrderSettlementUpdate::failed("late failure"))
            .await;
        assert_eq!(second, Err(OrderStoreError::AlreadyCompleted(id.clone())));

        // First settlement evidence survives untouched.
        let record = store.get(&id).unwrap();
        assert_eq!(record.status, OrderStatus::Completed);
        assert_eq!(record.tx_id.as_deref(), Some("0xabc"));
    }

    #[tokio::test]
    async fn unknown_order_is_not_found() {
        let store = InMemoryOrderStore::new();
        let id = OrderId::from("ghost");
        let result = store
            .update_settlement(&id, OrderSettlementUpdate::failed("nope"))
            .await;
        assert_eq!(result, Err(OrderStoreError::NotFound(id)));
    }
}
