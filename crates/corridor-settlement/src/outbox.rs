//! Reconciliation outbox for settle-succeeded / persist-failed conditions.
//!
//! When funds have moved on-ledger but the order record could not be updated,
//! the settlement evidence must not be lost with the response. The router
//! records a [`ReconciliationEvent`] here so an external reconciler can
//! replay the order write at least once.

use dashmap::DashMap;

use corridor_types::network::NetworkId;
use corridor_types::order::OrderId;
use corridor_types::timestamp::UnixTimestamp;

/// Settlement evidence awaiting order-record reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationEvent {
    pub order_id: OrderId,
    pub network: NetworkId,
    pub tx_id: String,
    pub tx_hash: Option<String>,
    /// Why the direct order write failed.
    pub reason: String,
    pub timestamp: UnixTimestamp,
}

#[async_trait::async_trait]
pub trait Outbox: Send + Sync {
    async fn record(&self, event: ReconciliationEvent);
}

/// Dashmap-backed [`Outbox`] keyed by order id.
#[derive(Debug, Default)]
pub struct InMemoryOutbox {
    events: DashMap<OrderId, Vec<ReconciliationEvent>>,
}

impl InMemoryOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events_for(&self, order_id: &OrderId) -> Vec<ReconciliationEvent> {
        self.events
            .get(order_id)
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Removes and returns every recorded event, for reconciler sweeps.
    pub fn drain(&self) -> Vec<ReconciliationEvent> {
        let keys: Vec<OrderId> = self.events.iter().map(|e| e.key().clone()).collect();
        let mut drained = Vec::new();
        for key in keys {
            if let Some((_, mut events)) = self.events.remove(&key) {
                drained.append(&mut events);
            }
        }
        drained
    }
}

#[async_trait::async_trait]
impl Outbox for InMemoryOutbox {
    async fn record(&self, event: ReconciliationEvent) {
        self.events
            .entry(event.order_id.clone())
            .or_default()
            .push(event);
    }
}
