//! Priority failover across ledger adapters.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use corridor_registry::NetworkRegistry;
use corridor_types::order::{OrderId, OrderSettlementUpdate, OrderStore};
use corridor_types::timestamp::UnixTimestamp;
use corridor_types::transfer::{
    AttemptFailure, RoutingError, RoutingResult, SettledTransfer, TransferFailureKind,
    TransferOutcome, TransferRequest,
};

use crate::adapters::AdapterRegistry;
use crate::outbox::{Outbox, ReconciliationEvent};

/// Routes one transfer across candidate networks in priority order.
///
/// The router tries each candidate's adapter sequentially and stops at the
/// first settlement. A network that failed for the current transfer is never
/// retried — per-ledger submission retries live inside the adapters. The
/// order record is written exactly once, on the branch that terminates the
/// loop; intermediate failures only accumulate in the attempt list.
pub struct SettlementRouter {
    registry: Arc<NetworkRegistry>,
    adapters: AdapterRegistry,
    orders: Arc<dyn OrderStore>,
    outbox: Arc<dyn Outbox>,
}

impl SettlementRouter {
    pub fn new(
        registry: Arc<NetworkRegistry>,
        adapters: AdapterRegistry,
        orders: Arc<dyn OrderStore>,
        outbox: Arc<dyn Outbox>,
    ) -> Self {
        Self {
            registry,
            adapters,
            orders,
            outbox,
        }
    }

    pub fn registry(&self) -> &NetworkRegistry {
        &self.registry
    }

    /// Routes `request` to settlement, trying candidates until one settles or
    /// all are exhausted.
    pub async fn transfer(&self, request: &TransferRequest) -> RoutingResult {
        self.transfer_cancellable(request, &CancellationToken::new())
            .await
    }

    /// Like [`transfer`](Self::transfer), but checks `cancel` before each
    /// candidate. An attempt already handed to an adapter runs to its own
    /// outcome; cancellation only skips candidates not yet tried. A cancelled
    /// route reports the cancellation in the aggregated error instead of
    /// claiming every network failed.
    pub async fn transfer_cancellable(
        &self,
        request: &TransferRequest,
        cancel: &CancellationToken,
    ) -> RoutingResult {
        let candidates = self.registry.candidates_for(&request.token);
        if candidates.is_empty() {
            warn!(token = %request.token, "no enabled network supports token");
            let routing_error = RoutingError::UnsupportedToken {
                symbol: request.token.clone(),
            };
            self.record_failed(request.order_id.as_ref(), routing_error.to_string())
                .await;
            return RoutingResult {
                settlement: None,
                attempted_networks: Vec::new(),
                error: Some(routing_error),
            };
        }

        let mut attempted = Vec::new();
        let mut failures: Vec<AttemptFailure> = Vec::new();

        for candidate in &candidates {
            if cancel.is_cancelled() {
                info!(token = %request.token, "cancelled, skipping remaining candidates");
                break;
            }
            let network_id = &candidate.network.id;
            attempted.push(network_id.clone());

            let Some(adapter) = self.adapters.by_network_id(network_id) else {
                warn!(network = %network_id, "candidate network has no configured adapter");
                failures.push(AttemptFailure {
                    network: network_id.clone(),
                    kind: TransferFailureKind::Other,
                    message: "no adapter configured for network".to_string(),
                });
                continue;
            };

            info!(network = %network_id, token = %request.token, amount = %request.amount, "attempting settlement");
            match adapter.transfer(candidate.token, request).await {
                TransferOutcome::Settled(settled) => {
                    info!(network = %network_id, tx_id = settled.tx_id, "transfer settled");
                    let error = self
                        .record_completed(request.order_id.as_ref(), &settled)
                        .await;
                    return RoutingResult {
                        settlement: Some(settled),
                        attempted_networks: attempted,
                        error,
                    };
                }
                TransferOutcome::Failed(failure) => {
                    warn!(
                        network = %network_id,
                        kind = %failure.kind,
                        message = failure.message,
                        "attempt failed, moving to next candidate"
                    );
                    failures.push(failure.into());
                }
            }
        }

        let cancelled = cancel.is_cancelled();
        let last_error = match (failures.last(), cancelled) {
            (Some(failure), false) => failure.message.clone(),
            (Some(failure), true) => format!(
                "routing cancelled with candidates remaining; last error: {}",
                failure.message
            ),
            (None, _) => "routing cancelled before any attempt".to_string(),
        };
        let attempted_list = attempted
            .iter()
            .map(|n| n.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let routing_error = RoutingError::AllNetworksFailed {
            failures,
            last_error: last_error.clone(),
        };
        if cancelled {
            warn!(token = %request.token, attempted = attempted_list, last_error, "routing cancelled before exhausting candidates");
        } else {
            warn!(token = %request.token, attempted = attempted_list, last_error, "all candidate networks failed");
        }
        self.record_failed(
            request.order_id.as_ref(),
            format!("attempted networks: [{attempted_list}]; last error: {last_error}"),
        )
        .await;
        RoutingResult {
            settlement: None,
            attempted_networks: attempted,
            error: Some(routing_error),
        }
    }

    /// The success-branch order write. A failure here does not undo the
    /// settlement: the evidence goes to the outbox and the caller gets a
    /// distinct `OrderUpdateFailed` alongside it.
    async fn record_completed(
        &self,
        order_id: Option<&OrderId>,
        settled: &SettledTransfer,
    ) -> Option<RoutingError> {
        let order_id = order_id?;
        let update = OrderSettlementUpdate::completed(settled);
        match self.orders.update_settlement(order_id, update).await {
            Ok(()) => None,
            Err(store_error) => {
                error!(
                    order_id = %order_id,
                    network = %settled.network,
                    tx_id = settled.tx_id,
                    %store_error,
                    "funds settled but order update failed, recording for reconciliation"
                );
                self.outbox
                    .record(ReconciliationEvent {
                        order_id: order_id.clone(),
                        network: settled.network.clone(),
                        tx_id: settled.tx_id.clone(),
                        tx_hash: settled.tx_hash.clone(),
                        reason: store_error.to_string(),
                        timestamp: UnixTimestamp::now(),
                    })
                    .await;
                Some(RoutingError::OrderUpdateFailed {
                    network: settled.network.clone(),
                    tx_id: settled.tx_id.clone(),
                    message: store_error.to_string(),
                })
            }
        }
    }

    /// The failure-branch order write. Nothing settled, so a store failure
    /// here is log-only; the order stays in its pre-terminal state.
    async fn record_failed(&self, order_id: Option<&OrderId>, message: String) {
        let Some(order_id) = order_id else {
            return;
        };
        let update = OrderSettlementUpdate::failed(message);
        if let Err(store_error) = self.orders.update_settlement(order_id, update).await {
            error!(order_id = %order_id, %store_error, "failed to mark order as failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_order_store::{InMemoryOrderStore, OrderRecord};
    use crate::outbox::InMemoryOutbox;
    use corridor_types::adapter::ChainAdapter;
    use corridor_types::network::{
        ConnectionInfo, NetworkFamily, NetworkId, NetworkInfo, TokenInfo, TokenSymbol,
    };
    use corridor_types::order::{OrderStatus, OrderStoreError};
    use corridor_types::transfer::TransferFailure;
    use rust_decimal::Decimal;
    use std::collections::VecDeque;
    use std::str::FromStr;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeAdapter {
        network: NetworkId,
        outcomes: Mutex<VecDeque<TransferOutcome>>,
        calls: AtomicUsize,
        cancel_on_call: Option<CancellationToken>,
    }

    impl FakeAdapter {
        fn new(network: &str, outcomes: Vec<TransferOutcome>) -> Arc<Self> {
            Arc::new(Self {
                network: NetworkId::new(network),
                outcomes: Mutex::new(outcomes.into()),
                calls: AtomicUsize::new(0),
                cancel_on_call: None,
            })
        }

        fn cancelling(network: &str, outcome: TransferOutcome, token: CancellationToken) -> Arc<Self> {
            Arc::new(Self {
                network: NetworkId::new(network),
                outcomes: Mutex::new(vec![outcome].into()),
                calls: AtomicUsize::new(0),
                cancel_on_call: Some(token),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl ChainAdapter for FakeAdapter {
        fn network_id(&self) -> &NetworkId {
            &self.network
        }

        fn family(&self) -> NetworkFamily {
            NetworkFamily::ContractLedger
        }

        fn operator_address(&self) -> String {
            "0x0000000000000000000000000000000000000001".to_string()
        }

        async fn transfer(&self, _token: &TokenInfo, _request: &TransferRequest) -> TransferOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(token) = &self.cancel_on_call {
                token.cancel();
            }
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .expect("adapter invoked more times than the test scripted")
        }
    }

    struct FailingStore;

    #[async_trait::async_trait]
    impl OrderStore for FailingStore {
        async fn update_settlement(
            &self,
            order_id: &OrderId,
            _update: OrderSettlementUpdate,
        ) -> Result<(), OrderStoreError> {
            let _ = order_id;
            Err(OrderStoreError::Backend("store unavailable".to_string()))
        }
    }

    struct CountingStore {
        inner: InMemoryOrderStore,
        writes: AtomicUsize,
    }

    impl CountingStore {
        fn with_pending(order_id: &OrderId) -> Arc<Self> {
            let inner = InMemoryOrderStore::new();
            inner.insert(OrderRecord::pending(order_id.clone()));
            Arc::new(Self {
                inner,
                writes: AtomicUsize::new(0),
            })
        }

        fn writes(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl OrderStore for CountingStore {
        async fn update_settlement(
            &self,
            order_id: &OrderId,
            update: OrderSettlementUpdate,
        ) -> Result<(), OrderStoreError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.update_settlement(order_id, update).await
        }
    }

    fn network(id: &str, priority: u32, fee: &str) -> NetworkInfo {
        NetworkInfo {
            id: NetworkId::new(id),
            family: NetworkFamily::ContractLedger,
            priority,
            fee: Decimal::from_str(fee).unwrap(),
            enabled: true,
            testnet: false,
            connection: ConnectionInfo::ContractLedger {
                endpoint: url::Url::parse("https://rpc.example.org").unwrap(),
                chain_id: 8453,
            },
        }
    }

    fn token(symbol: &str, network: &str) -> TokenInfo {
        TokenInfo {
            symbol: TokenSymbol::new(symbol),
            network: NetworkId::new(network),
            asset: "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913".to_string(),
            decimals: 6,
            enabled: true,
        }
    }

    /// network-a at priority 1 (fee 0.0001), network-b at priority 2 (fee 0.03),
    /// both carrying USDC.
    fn registry() -> Arc<NetworkRegistry> {
        Arc::new(NetworkRegistry::new(
            vec![network("network-b", 2, "0.03"), network("network-a", 1, "0.0001")],
            vec![token("USDC", "network-a"), token("USDC", "network-b")],
        ))
    }

    fn settled(network: &str, tx_id: &str) -> TransferOutcome {
        TransferOutcome::Settled(SettledTransfer {
            network: NetworkId::new(network),
            tx_id: tx_id.to_string(),
            tx_hash: None,
            fee_paid: Decimal::from(21_000),
            timestamp: UnixTimestamp::from_secs(1_700_000_000),
        })
    }

    fn failed(network: &str, kind: TransferFailureKind, message: &str) -> TransferOutcome {
        TransferOutcome::Failed(TransferFailure {
            network: NetworkId::new(network),
            kind,
            message: message.to_string(),
            timestamp: UnixTimestamp::from_secs(1_700_000_000),
        })
    }

    fn request(order_id: Option<&str>) -> TransferRequest {
        TransferRequest {
            sender: "treasury".to_string(),
            recipient: "0x00000000000000000000000000000000000000aa".to_string(),
            token: TokenSymbol::new("USDC"),
            amount: Decimal::from(100),
            memo: None,
            order_id: order_id.map(OrderId::from),
        }
    }

    fn router_with(
        adapters: Vec<Arc<FakeAdapter>>,
        orders: Arc<dyn OrderStore>,
    ) -> (SettlementRouter, Arc<InMemoryOutbox>) {
        let outbox = Arc::new(InMemoryOutbox::new());
        let router = SettlementRouter::new(
            registry(),
            AdapterRegistry::from_adapters(
                adapters.into_iter().map(|a| a as Arc<dyn ChainAdapter>).collect(),
            ),
            orders,
            outbox.clone(),
        );
        (router, outbox)
    }

    #[tokio::test]
    async fn unsupported_token_short_circuits_without_adapter_calls() {
        let adapter = FakeAdapter::new("network-a", vec![]);
        let order_id = OrderId::from("order-1");
        let store = CountingStore::with_pending(&order_id);
        let (router, _) = router_with(vec![adapter.clone()], store.clone());

        let mut req = request(Some("order-1"));
        req.token = TokenSymbol::new("EURC");
        let result = router.transfer(&req).await;

        assert!(result.settlement.is_none());
        assert!(result.attempted_networks.is_empty());
        assert!(matches!(
            result.error,
            Some(RoutingError::UnsupportedToken { .. })
        ));
        assert_eq!(adapter.calls(), 0);
        assert_eq!(store.inner.get(&order_id).unwrap().status, OrderStatus::Failed);
    }

    #[tokio::test]
    async fn settles_on_first_candidate_with_single_order_write() {
        let adapter_a = FakeAdapter::new("network-a", vec![settled("network-a", "0xaaa")]);
        let adapter_b = FakeAdapter::new("network-b", vec![]);
        let order_id = OrderId::from("order-1");
        let store = CountingStore::with_pending(&order_id);
        let (router, _) = router_with(vec![adapter_a.clone(), adapter_b.clone()], store.clone());

        let result = router.transfer(&request(Some("order-1"))).await;

        assert!(result.error.is_none());
        let settlement = result.settlement.unwrap();
        assert_eq!(settlement.network, NetworkId::new("network-a"));
        assert_eq!(result.attempted_networks, vec![NetworkId::new("network-a")]);
        assert_eq!(adapter_a.calls(), 1);
        assert_eq!(adapter_b.calls(), 0);
        assert_eq!(store.writes(), 1);

        let record = store.inner.get(&order_id).unwrap();
        assert_eq!(record.status, OrderStatus::Completed);
        assert_eq!(record.tx_id.as_deref(), Some("0xaaa"));
    }

    #[tokio::test]
    async fn fails_over_to_second_priority_network() {
        let adapter_a = FakeAdapter::new(
            "network-a",
            vec![failed(
                "network-a",
                TransferFailureKind::InsufficientBalance,
                "operator balance 0 below transfer amount 100000000",
            )],
        );
        let adapter_b = FakeAdapter::new("network-b", vec![settled("network-b", "0xbbb")]);
        let order_id = OrderId::from("order-1");
        let store = CountingStore::with_pending(&order_id);
        let (router, _) = router_with(vec![adapter_a.clone(), adapter_b.clone()], store.clone());

        let result = router.transfer(&request(Some("order-1"))).await;

        let settlement = result.settlement.unwrap();
        assert_eq!(settlement.network, NetworkId::new("network-b"));
        assert_eq!(
            result.attempted_networks,
            vec![NetworkId::new("network-a"), NetworkId::new("network-b")]
        );
        assert!(result.error.is_none());
        assert_eq!(adapter_a.calls(), 1);
        assert_eq!(adapter_b.calls(), 1);

        // Only the terminal outcome reaches the order record.
        assert_eq!(store.writes(), 1);
        let record = store.inner.get(&order_id).unwrap();
        assert_eq!(record.status, OrderStatus::Completed);
        assert_eq!(record.network_used, Some(NetworkId::new("network-b")));
        assert!(record.error.is_none());
    }

    #[tokio::test]
    async fn exhaustion_aggregates_failures_and_marks_order_failed() {
        let adapter_a = FakeAdapter::new(
            "network-a",
            vec![failed("network-a", TransferFailureKind::SubmissionFailure, "rpc down")],
        );
        let adapter_b = FakeAdapter::new(
            "network-b",
            vec![failed("network-b", TransferFailureKind::ConfirmationTimeout, "no receipt in 30s")],
        );
        let order_id = OrderId::from("order-1");
        let store = CountingStore::with_pending(&order_id);
        let (router, _) = router_with(vec![adapter_a.clone(), adapter_b.clone()], store.clone());

        let result = router.transfer(&request(Some("order-1"))).await;

        assert!(result.settlement.is_none());
        assert_eq!(result.attempted_networks.len(), 2);
        let Some(RoutingError::AllNetworksFailed { failures, last_error }) = result.error else {
            panic!("expected AllNetworksFailed");
        };
        assert_eq!(failures.len(), 2);
        assert_eq!(last_error, "no receipt in 30s");

        // Each network is tried exactly once per transfer.
        assert_eq!(adapter_a.calls(), 1);
        assert_eq!(adapter_b.calls(), 1);

        assert_eq!(store.writes(), 1);
        let record = store.inner.get(&order_id).unwrap();
        assert_eq!(record.status, OrderStatus::Failed);
        let message = record.error.unwrap();
        assert!(message.contains("network-a"));
        assert!(message.contains("network-b"));
        assert!(message.contains("no receipt in 30s"));
    }

    #[tokio::test]
    async fn order_update_failure_surfaces_with_settlement_evidence() {
        let adapter = FakeAdapter::new("network-a", vec![settled("network-a", "0xaaa")]);
        let (router, outbox) = router_with(vec![adapter], Arc::new(FailingStore));

        let result = router.transfer(&request(Some("order-1"))).await;

        // Funds moved: the settlement must be present even though the order
        // write failed.
        assert!(result.settlement.is_some());
        let Some(RoutingError::OrderUpdateFailed { network, tx_id, .. }) = result.error else {
            panic!("expected OrderUpdateFailed");
        };
        assert_eq!(network, NetworkId::new("network-a"));
        assert_eq!(tx_id, "0xaaa");

        let events = outbox.events_for(&OrderId::from("order-1"));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].tx_id, "0xaaa");
    }

    #[tokio::test]
    async fn cancellation_skips_remaining_candidates() {
        let cancel = CancellationToken::new();
        let adapter_a = FakeAdapter::cancelling(
            "network-a",
            failed("network-a", TransferFailureKind::SubmissionFailure, "rpc down"),
            cancel.clone(),
        );
        let adapter_b = FakeAdapter::new("network-b", vec![settled("network-b", "0xbbb")]);
        let order_id = OrderId::from("order-1");
        let store = CountingStore::with_pending(&order_id);
        let (router, _) = router_with(vec![adapter_a.clone(), adapter_b.clone()], store.clone());

        let result = router
            .transfer_cancellable(&request(Some("order-1")), &cancel)
            .await;

        assert!(result.settlement.is_none());
        assert_eq!(result.attempted_networks, vec![NetworkId::new("network-a")]);
        assert_eq!(adapter_a.calls(), 1);
        assert_eq!(adapter_b.calls(), 0);

        // The skipped candidate was never tried, so the error must report a
        // cancellation rather than exhaustion.
        let Some(RoutingError::AllNetworksFailed { failures, last_error }) = result.error else {
            panic!("expected AllNetworksFailed");
        };
        assert_eq!(failures.len(), 1);
        assert!(last_error.contains("cancelled"));
        assert!(last_error.contains("rpc down"));

        assert_eq!(store.writes(), 1);
        let record = store.inner.get(&order_id).unwrap();
        assert_eq!(record.status, OrderStatus::Failed);
        assert!(record.error.unwrap().contains("cancelled"));
    }

    #[tokio::test]
    async fn requests_without_order_id_skip_persistence() {
        let adapter = FakeAdapter::new("network-a", vec![settled("network-a", "0xaaa")]);
        let order_id = OrderId::from("untouched");
        let store = CountingStore::with_pending(&order_id);
        let (router, _) = router_with(vec![adapter], store.clone());

        let result = router.transfer(&request(None)).await;

        assert!(result.is_settled());
        assert!(result.error.is_none());
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn missing_adapter_counts_as_failed_attempt() {
        // Only network-b has an adapter; network-a is registry-only drift.
        let adapter_b = FakeAdapter::new("network-b", vec![settled("network-b", "0xbbb")]);
        let (router, _) = router_with(vec![adapter_b.clone()], Arc::new(InMemoryOrderStore::new()));

        let result = router.transfer(&request(None)).await;

        let settlement = result.settlement.unwrap();
        assert_eq!(settlement.network, NetworkId::new("network-b"));
        assert_eq!(
            result.attempted_networks,
            vec![NetworkId::new("network-a"), NetworkId::new("network-b")]
        );
        assert_eq!(adapter_b.calls(), 1);
    }
}
