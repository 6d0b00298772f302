//! HTTP surface of the hosted settlement service.
//!
//! - `POST /transfer` — route a transfer across candidate networks
//! - `GET /networks` — the enabled network catalog
//! - `GET /estimates` — per-network cost estimates for a token/amount
//! - `GET /health` — liveness

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use corridor_registry::estimator::estimate_costs;
use corridor_types::network::{NetworkFamily, NetworkId, NetworkInfo, TokenSymbol};
use corridor_types::transfer::{RoutingError, TransferRequest};

use crate::router::SettlementRouter;

pub fn routes() -> axum::Router<Arc<SettlementRouter>> {
    axum::Router::new()
        .route("/transfer", post(post_transfer))
        .route("/networks", get(get_networks))
        .route("/estimates", get(get_estimates))
        .route("/health", get(get_health))
}

async fn post_transfer(
    State(router): State<Arc<SettlementRouter>>,
    Json(request): Json<TransferRequest>,
) -> impl IntoResponse {
    let result = router.transfer(&request).await;
    let status = match &result.error {
        None => StatusCode::OK,
        // Funds moved; the persistence problem is flagged in the body but
        // the settlement itself succeeded.
        Some(RoutingError::OrderUpdateFailed { .. }) => StatusCode::OK,
        Some(RoutingError::UnsupportedToken { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
        Some(RoutingError::AllNetworksFailed { .. }) => StatusCode::BAD_GATEWAY,
    };
    (status, Json(result))
}

/// Catalog entry exposed over HTTP. Connection details stay server-side:
/// resolved RPC endpoints can be keyed URLs.
#[derive(Debug, Serialize)]
struct NetworkCatalogEntry {
    id: NetworkId,
    family: NetworkFamily,
    priority: u32,
    fee: Decimal,
    testnet: bool,
}

impl From<&NetworkInfo> for NetworkCatalogEntry {
    fn from(network: &NetworkInfo) -> Self {
        Self {
            id: network.id.clone(),
            family: network.family,
            priority: network.priority,
            fee: network.fee,
            testnet: network.testnet,
        }
    }
}

async fn get_networks(State(router): State<Arc<SettlementRouter>>) -> impl IntoResponse {
    let networks: Vec<NetworkCatalogEntry> = router
        .registry()
        .list_enabled_networks()
        .into_iter()
        .map(NetworkCatalogEntry::from)
        .collect();
    Json(networks)
}

#[derive(Debug, Deserialize)]
struct EstimateQuery {
    token: String,
    amount: Decimal,
}

async fn get_estimates(
    State(router): State<Arc<SettlementRouter>>,
    Query(query): Query<EstimateQuery>,
) -> impl IntoResponse {
    let estimates = estimate_costs(
        router.registry(),
        &TokenSymbol::new(query.token),
        query.amount,
    );
    Json(estimates)
}

async fn get_health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use corridor_types::network::ConnectionInfo;
    use std::str::FromStr;

    #[test]
    fn network_catalog_omits_connection_details() {
        let network = NetworkInfo {
            id: NetworkId::new("base"),
            family: NetworkFamily::ContractLedger,
            priority: 1,
            fee: Decimal::from_str("0.0001").unwrap(),
            enabled: true,
            testnet: false,
            connection: ConnectionInfo::ContractLedger {
                endpoint: url::Url::parse("https://mainnet.example.org/v2/keyed-rpc-credential")
                    .unwrap(),
                chain_id: 8453,
            },
        };

        let body = serde_json::to_string(&NetworkCatalogEntry::from(&network)).unwrap();

        assert!(body.contains("\"id\":\"base\""));
        assert!(body.contains("\"family\":\"contract-ledger\""));
        assert!(body.contains("\"priority\":1"));
        assert!(!body.contains("keyed-rpc-credential"));
        assert!(!body.contains("endpoint"));
        assert!(!body.contains("connection"));
        assert!(!body.contains("chain_id"));
    }
}
