//! Transfer requests, per-attempt outcomes, and routing results.
//!
//! A [`TransferRequest`] describes what the caller wants moved. Each adapter
//! invocation produces exactly one [`TransferOutcome`]; adapters never let a
//! ledger-library error escape their boundary. The router aggregates attempt
//! outcomes into a single [`RoutingResult`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::network::{NetworkId, TokenSymbol};
use crate::order::OrderId;
use crate::timestamp::UnixTimestamp;

/// An immutable instruction to move `amount` of `token` from the operator's
/// treasury to `recipient`.
///
/// Addresses are kept as strings because their format is ledger-specific;
/// each adapter validates them against its own ledger's rules. When
/// `order_id` is absent the router skips order persistence entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub sender: String,
    pub recipient: String,
    pub token: TokenSymbol,
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
}

/// Classification of a failed transfer attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferFailureKind {
    InvalidAddress,
    InsufficientBalance,
    SubmissionFailure,
    ConfirmationTimeout,
    Other,
}

impl Display for TransferFailureKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TransferFailureKind::InvalidAddress => "invalid_address",
            TransferFailureKind::InsufficientBalance => "insufficient_balance",
            TransferFailureKind::SubmissionFailure => "submission_failure",
            TransferFailureKind::ConfirmationTimeout => "confirmation_timeout",
            TransferFailureKind::Other => "other",
        };
        write!(f, "{s}")
    }
}

/// Evidence of a confirmed on-ledger settlement.
///
/// `fee_paid` is denominated in the ledger's native units (wei on contract
/// ledgers, lamports on account ledgers). `tx_hash` is populated on ledgers
/// where the transaction hash differs from the submission identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettledTransfer {
    pub network: NetworkId,
    pub tx_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    pub fee_paid: Decimal,
    pub timestamp: UnixTimestamp,
}

/// A single failed adapter attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferFailure {
    pub network: NetworkId,
    pub kind: TransferFailureKind,
    pub message: String,
    pub timestamp: UnixTimestamp,
}

/// The one value an adapter invocation produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransferOutcome {
    Settled(SettledTransfer),
    Failed(TransferFailure),
}

impl TransferOutcome {
    pub fn is_settled(&self) -> bool {
        matches!(self, TransferOutcome::Settled(_))
    }

    pub fn network(&self) -> &NetworkId {
        match self {
            TransferOutcome::Settled(s) => &s.network,
            TransferOutcome::Failed(f) => &f.network,
        }
    }
}

/// A failed attempt as recorded in the routing aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptFailure {
    pub network: NetworkId,
    pub kind: TransferFailureKind,
    pub message: String,
}

impl From<TransferFailure> for AttemptFailure {
    fn from(failure: TransferFailure) -> Self {
        Self {
            network: failure.network,
            kind: failure.kind,
            message: failure.message,
        }
    }
}

/// Terminal routing errors.
///
/// `OrderUpdateFailed` is deliberately distinct from settlement failure: funds
/// moved on-ledger but the order record could not be updated, so the caller
/// must treat the settlement as real and reconcile the record.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoutingError {
    #[error("no enabled network supports token {symbol}")]
    UnsupportedToken { symbol: TokenSymbol },
    #[error("all candidate networks failed; last error: {last_error}")]
    AllNetworksFailed {
        failures: Vec<AttemptFailure>,
        last_error: String,
    },
    #[error("settled on {network} (tx {tx_id}) but the order record update failed: {message}")]
    OrderUpdateFailed {
        network: NetworkId,
        tx_id: String,
        message: String,
    },
}

/// Aggregate result of routing one transfer across candidate networks.
///
/// `settlement` and `error` can both be present: a settled transfer whose
/// order write-back failed carries `RoutingError::OrderUpdateFailed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settlement: Option<SettledTransfer>,
    pub attempted_networks: Vec<NetworkId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RoutingError>,
}

impl RoutingResult {
    /// True when funds actually moved, regardless of persistence outcome.
    pub fn is_settled(&self) -> bool {
        self.settlement.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn outcome_serializes_with_status_tag() {
        let outcome = TransferOutcome::Settled(SettledTransfer {
            network: NetworkId::new("base"),
            tx_id: "0xabc".to_string(),
            tx_hash: Some("0xabc".to_string()),
            fee_paid: Decimal::from_str("21000").unwrap(),
            timestamp: UnixTimestamp::from_secs(1_700_000_000),
        });
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "settled");
        assert_eq!(json["network"], "base");
        assert_eq!(json["fee_paid"], "21000");
    }

    #[test]
    fn order_update_failed_is_not_a_settlement_failure() {
        let result = RoutingResult {
            settlement: Some(SettledTransfer {
                network: NetworkId::new("base"),
                tx_id: "0xabc".to_string(),
                tx_hash: None,
                fee_paid: Decimal::ZERO,
                timestamp: UnixTimestamp::from_secs(0),
            }),
            attempted_networks: vec![NetworkId::new("base")],
            error: Some(RoutingError::OrderUpdateFailed {
                network: NetworkId::new("base"),
                tx_id: "0xabc".to_string(),
                message: "store unavailable".to_string(),
            }),
        };
        assert!(result.is_settled());
    }

    #[test]
    fn request_without_optionals_parses() {
        let request: TransferRequest = serde_json::from_str(
            r#"{"sender":"op","recipient":"dest","token":"USDC","amount":"100"}"#,
        )
        .unwrap();
        assert!(request.memo.is_none());
        assert!(request.order_id.is_none());
        assert_eq!(request.amount, Decimal::from(100));
    }
}
