//! Settlement orchestration for Corridor.
//!
//! [`router::SettlementRouter`] is the heart of the service: it resolves
//! routing candidates from the registry, tries each network's adapter in
//! priority order, and writes the terminal outcome to the order store exactly
//! once. The crate also carries the adapter registry, the in-memory order
//! store and reconciliation outbox, and the Axum handlers for the hosted
//! service.

pub mod adapters;
pub mod handlers;
pub mod memory_order_store;
pub mod outbox;
pub mod router;

pub use adapters::AdapterRegistry;
pub use memory_order_store::{InMemoryOrderStore, OrderRecord};
pub use outbox::{InMemoryOutbox, Outbox, ReconciliationEvent};
pub use router::SettlementRouter;
