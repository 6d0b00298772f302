//! The contract-ledger settlement adapter.

use alloy_network::EthereumWallet;
use alloy_primitives::{Address, B256, U256};
use alloy_provider::fillers::{
    BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller, WalletFiller,
};
use alloy_provider::{Identity, PendingTransactionError, Provider, ProviderBuilder, RootProvider};
use alloy_rpc_client::RpcClient;
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use alloy_transport::TransportError;
use alloy_transport_http::Http;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

use corridor_types::adapter::ChainAdapter;
use corridor_types::amount::{TokenAmountError, to_base_units};
use corridor_types::network::{NetworkFamily, NetworkId, TokenInfo};
use corridor_types::timestamp::UnixTimestamp;
use corridor_types::transfer::{
    SettledTransfer, TransferFailure, TransferFailureKind, TransferOutcome, TransferRequest,
};

use crate::config::EvmLedgerConfig;
use crate::erc20::IERC20;

/// Combined filler type for gas, blob gas, nonce, and chain ID.
pub type InnerFiller =
    JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>;

/// The fully composed provider type: filler stack plus wallet signing over a
/// [`RootProvider`] doing the actual JSON-RPC communication.
pub type InnerProvider = FillProvider<
    JoinFill<JoinFill<Identity, InnerFiller>, WalletFiller<EthereumWallet>>,
    RootProvider,
>;

/// Settlement adapter for EVM-compatible contract ledgers.
///
/// Executes ERC-20 `transfer` calls signed by the operator key. Gas pricing
/// is automatic on EIP-1559 chains; legacy chains get an explicit gas price
/// fetched per transaction. Receipt waits are bounded by the configured
/// timeout, and a reverted receipt is a failed attempt like any other.
#[derive(Debug)]
pub struct EvmChainAdapter {
    network: NetworkId,
    eip1559: bool,
    confirmations: u64,
    receipt_timeout: Duration,
    operator: Address,
    inner: InnerProvider,
}

impl EvmChainAdapter {
    /// Builds the adapter for one configured network.
    ///
    /// Fails on an invalid operator key; the RPC connection itself is lazy,
    /// so endpoint problems surface on the first transfer attempt.
    pub fn new(
        network: NetworkId,
        config: &EvmLedgerConfig,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let key = B256::from_slice(config.signer.as_bytes());
        let signer = PrivateKeySigner::from_bytes(&key)?.with_chain_id(Some(config.chain_id));
        let operator = signer.address();
        let wallet = EthereumWallet::from(signer);

        let client = RpcClient::new(Http::new((*config.rpc).clone()), false);
        let filler = JoinFill::new(
            GasFiller,
            JoinFill::new(
                BlobGasFiller::default(),
                JoinFill::new(NonceFiller::default(), ChainIdFiller::default()),
            ),
        );
        let inner: InnerProvider = ProviderBuilder::default()
            .filler(filler)
            .wallet(wallet)
            .connect_client(client);

        info!(network = %network, chain_id = config.chain_id, operator = %operator, "configured contract-ledger adapter");

        Ok(Self {
            network,
            eip1559: config.eip1559,
            confirmations: config.confirmations,
            receipt_timeout: Duration::from_secs(config.receipt_timeout_secs),
            operator,
            inner,
        })
    }

    async fn try_transfer(
        &self,
        token: &TokenInfo,
        request: &TransferRequest,
    ) -> Result<SettledTransfer, EvmTransferError> {
        // Address validation comes first so a typo never reaches the RPC.
        let recipient = Address::from_str(&request.recipient)
            .map_err(|_| EvmTransferError::InvalidRecipient(request.recipient.clone()))?;
        let token_address = Address::from_str(&token.asset)
            .map_err(|_| EvmTransferError::InvalidAsset(token.asset.clone()))?;
        let value = U256::from(to_base_units(request.amount, token.decimals)?);

        let erc20 = IERC20::new(token_address, &self.inner);

        let balance = erc20.balanceOf(self.operator).call().await?;
        if balance < value {
            return Err(EvmTransferError::InsufficientBalance {
                balance,
                required: value,
            });
        }

        let mut call = erc20.transfer(recipient, value);
        if !self.eip1559 {
            let gas_price: u128 = self.inner.get_gas_price().await?;
            call = call.gas_price(gas_price);
        }

        let pending = call.send().await?;
        let tx_hash = *pending.tx_hash();
        info!(network = %self.network, tx_hash = %tx_hash, "submitted transfer, awaiting receipt");

        let receipt = pending
            .with_required_confirmations(self.confirmations)
            .with_timeout(Some(self.receipt_timeout))
            .get_receipt()
            .await?;

        if !receipt.status() {
            return Err(EvmTransferError::Reverted(
                receipt.transaction_hash.to_string(),
            ));
        }

        let fee_wei = u128::from(receipt.gas_used) * receipt.effective_gas_price;
        Ok(SettledTransfer {
            network: self.network.clone(),
            tx_id: receipt.transaction_hash.to_string(),
            tx_hash: Some(receipt.transaction_hash.to_string()),
            fee_paid: Decimal::from_u128(fee_wei).unwrap_or(Decimal::MAX),
            timestamp: UnixTimestamp::now(),
        })
    }
}

#[async_trait::async_trait]
impl ChainAdapter for EvmChainAdapter {
    fn network_id(&self) -> &NetworkId {
        &self.network
    }

    fn family(&self) -> NetworkFamily {
        NetworkFamily::ContractLedger
    }

    fn operator_address(&self) -> String {
        self.operator.to_string()
    }

    async fn transfer(&self, token: &TokenInfo, request: &TransferRequest) -> TransferOutcome {
        match self.try_transfer(token, request).await {
            Ok(settled) => TransferOutcome::Settled(settled),
            Err(error) => {
                warn!(network = %self.network, kind = %error.kind(), %error, "transfer attempt failed");
                TransferOutcome::Failed(TransferFailure {
                    network: self.network.clone(),
                    kind: error.kind(),
                    message: error.to_string(),
                    timestamp: UnixTimestamp::now(),
                })
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum EvmTransferError {
    #[error("invalid recipient address '{0}'")]
    InvalidRecipient(String),
    #[error("invalid token contract address '{0}'")]
    InvalidAsset(String),
    #[error(transparent)]
    Amount(#[from] TokenAmountError),
    #[error("operator balance {balance} below transfer amount {required}")]
    InsufficientBalance { balance: U256, required: U256 },
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Contract(#[from] alloy_contract::Error),
    #[error(transparent)]
    PendingTransaction(#[from] PendingTransactionError),
    #[error("transaction {0} reverted")]
    Reverted(String),
}

impl EvmTransferError {
    fn kind(&self) -> TransferFailureKind {
        match self {
            EvmTransferError::InvalidRecipient(_) => TransferFailureKind::InvalidAddress,
            EvmTransferError::InsufficientBalance { .. } => {
                TransferFailureKind::InsufficientBalance
            }
            EvmTransferError::Transport(_)
            | EvmTransferError::Contract(_)
            | EvmTransferError::Reverted(_) => TransferFailureKind::SubmissionFailure,
            EvmTransferError::PendingTransaction(_) => TransferFailureKind::ConfirmationTimeout,
            EvmTransferError::InvalidAsset(_) | EvmTransferError::Amount(_) => {
                TransferFailureKind::Other
            }
        }
    }
}
