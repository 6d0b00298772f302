//! The account-ledger settlement adapter.

use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_commitment_config::CommitmentConfig;
use solana_keypair::Keypair;
use solana_message::VersionedMessage;
use solana_message::v0::Message as MessageV0;
use solana_pubkey::{Pubkey, pubkey};
use solana_signature::Signature;
use solana_signer::{Signer, SignerError};
use solana_transaction::Instruction;
use solana_transaction::versioned::VersionedTransaction;
use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use corridor_types::adapter::ChainAdapter;
use corridor_types::amount::{TokenAmountError, to_base_units};
use corridor_types::network::{NetworkFamily, NetworkId, TokenInfo};
use corridor_types::retry::RetryPolicy;
use corridor_types::timestamp::UnixTimestamp;
use corridor_types::transfer::{
    SettledTransfer, TransferFailure, TransferFailureKind, TransferOutcome, TransferRequest,
};
use rust_decimal::Decimal;

use crate::config::SolanaLedgerConfig;

/// Associated Token Account program.
pub const ATA_PROGRAM_PUBKEY: Pubkey = pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");

/// Memo program (v2).
pub const MEMO_PROGRAM_PUBKEY: Pubkey = pubkey!("MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr");

/// Base fee per signature in lamports, used when the fee query fails.
const BASE_SIGNATURE_FEE_LAMPORTS: u64 = 5_000;

/// Settlement adapter for Solana-style account ledgers.
///
/// The operator keypair is both the token authority and the fee payer. A
/// transfer derives the associated token accounts on both sides, checks the
/// operator's token balance first, then builds, signs, and submits a
/// `transfer_checked` transaction. Submission gets a bounded internal retry
/// with exponential backoff for transient RPC failures; confirmation waits
/// for confirmed commitment under the configured timeout. This retry is
/// per-ledger and invisible to the router's cross-network failover.
pub struct SolanaChainAdapter {
    network: NetworkId,
    keypair: Arc<Keypair>,
    rpc_client: Arc<RpcClient>,
    confirm_timeout: Duration,
    retry: RetryPolicy,
}

impl Debug for SolanaChainAdapter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolanaChainAdapter")
            .field("network", &self.network)
            .field("pubkey", &self.keypair.pubkey())
            .field("rpc_url", &self.rpc_client.url())
            .finish()
    }
}

impl SolanaChainAdapter {
    pub fn new(
        network: NetworkId,
        config: &SolanaLedgerConfig,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        // The key was validated as 64 base58 bytes at config parse time.
        let keypair = Keypair::from_base58_string(&config.signer.to_base58());
        let rpc_client = RpcClient::new(config.rpc.to_string());

        info!(
            network = %network,
            consensus_id = config.consensus_id,
            operator = %keypair.pubkey(),
            "configured account-ledger adapter"
        );

        Ok(Self {
            network,
            keypair: Arc::new(keypair),
            rpc_client: Arc::new(rpc_client),
            confirm_timeout: Duration::from_secs(config.confirm_timeout_secs),
            retry: config.retry,
        })
    }

    /// findAssociatedTokenPda
    fn associated_token_account(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
        let (ata, _) = Pubkey::find_program_address(
            &[owner.as_ref(), spl_token::ID.as_ref(), mint.as_ref()],
            &ATA_PROGRAM_PUBKEY,
        );
        ata
    }

    /// Places the operator signature at its required position in the message's
    /// signer set.
    fn sign(&self, mut tx: VersionedTransaction) -> Result<VersionedTransaction, SolanaTransferError> {
        let msg_bytes = tx.message.serialize();
        let signature = self.keypair.try_sign_message(msg_bytes.as_slice())?;
        let num_required = tx.message.header().num_required_signatures as usize;
        let static_keys = tx.message.static_account_keys();
        let pos = static_keys[..num_required]
            .iter()
            .position(|k| *k == self.keypair.pubkey())
            .ok_or(SolanaTransferError::MissingSigner)?;
        if tx.signatures.len() < num_required {
            tx.signatures.resize(num_required, Signature::default());
        }
        tx.signatures[pos] = signature;
        Ok(tx)
    }

    /// Submits with `skip_preflight` to avoid double simulation delays.
    async fn send(&self, tx: &VersionedTransaction) -> Result<Signature, SolanaTransferError> {
        let signature = self
            .rpc_client
            .send_transaction_with_config(
                tx,
                RpcSendTransactionConfig {
                    skip_preflight: true,
                    ..RpcSendTransactionConfig::default()
                },
            )
            .await?;
        Ok(signature)
    }

    async fn confirm(&self, signature: &Signature) -> Result<(), SolanaTransferError> {
        let commitment = CommitmentConfig::confirmed();
        let wait = async {
            loop {
                let confirmed = self
                    .rpc_client
                    .confirm_transaction_with_commitment(signature, commitment)
                    .await?;
                if confirmed.value {
                    return Ok::<(), SolanaTransferError>(());
                }
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
        };
        tokio::time::timeout(self.confirm_timeout, wait)
            .await
            .map_err(|_| SolanaTransferError::ConfirmationTimeout {
                timeout: self.confirm_timeout,
            })?
    }

    async fn try_transfer(
        &self,
        token: &TokenInfo,
        request: &TransferRequest,
    ) -> Result<SettledTransfer, SolanaTransferError> {
        let recipient = Pubkey::from_str(&request.recipient)
            .map_err(|_| SolanaTransferError::InvalidRecipient(request.recipient.clone()))?;
        let mint = Pubkey::from_str(&token.asset)
            .map_err(|_| SolanaTransferError::InvalidMint(token.asset.clone()))?;
        let amount = u64::try_from(to_base_units(request.amount, token.decimals)?)
            .map_err(|_| SolanaTransferError::AmountTooLarge)?;

        let operator = self.keypair.pubkey();
        let source_ata = Self::associated_token_account(&operator, &mint);
        let destination_ata = Self::associated_token_account(&recipient, &mint);

        let balance = self
            .rpc_client
            .get_token_account_balance(&source_ata)
            .await?
            .amount
            .parse::<u64>()
            .unwrap_or(0);
        if balance < amount {
            return Err(SolanaTransferError::InsufficientBalance {
                balance,
                required: amount,
            });
        }

        let mut instructions: Vec<Instruction> = vec![
            spl_token::instruction::transfer_checked(
                &spl_token::ID,
                &source_ata,
                &mint,
                &destination_ata,
                &operator,
                &[],
                amount,
                token.decimals,
            )
            .map_err(|e| SolanaTransferError::Build(format!("{e}")))?,
        ];
        if let Some(memo) = &request.memo {
            instructions.push(Instruction::new_with_bytes(
                MEMO_PROGRAM_PUBKEY,
                memo.as_bytes(),
                Vec::new(),
            ));
        }

        let recent_blockhash = self.rpc_client.get_latest_blockhash().await?;
        let message = MessageV0::try_compile(&operator, &instructions, &[], recent_blockhash)
            .map_err(|e| SolanaTransferError::Build(format!("{e:?}")))?;

        let fee_lamports = match self.rpc_client.get_fee_for_message(&message).await {
            Ok(fee) => fee,
            Err(error) => {
                warn!(network = %self.network, %error, "fee query failed, assuming base signature fee");
                BASE_SIGNATURE_FEE_LAMPORTS
            }
        };

        let tx = VersionedTransaction {
            signatures: vec![],
            message: VersionedMessage::V0(message),
        };
        let tx = self.sign(tx)?;

        let signature = retry_submission(&self.retry, &self.network, || self.send(&tx)).await?;
        info!(network = %self.network, %signature, "submitted transfer, awaiting confirmation");
        self.confirm(&signature).await?;

        Ok(SettledTransfer {
            network: self.network.clone(),
            tx_id: signature.to_string(),
            tx_hash: None,
            fee_paid: Decimal::from(fee_lamports),
            timestamp: UnixTimestamp::now(),
        })
    }
}

/// Reruns `submit` on failure with exponential backoff, up to the policy's
/// attempt cap. Only the submission step goes through here; resending the
/// same signed transaction with the same blockhash is idempotent, and every
/// failure raised before signing is final.
async fn retry_submission<T, F, Fut>(
    policy: &RetryPolicy,
    network: &NetworkId,
    mut submit: F,
) -> Result<T, SolanaTransferError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SolanaTransferError>>,
{
    let mut attempt = 0u32;
    loop {
        match submit().await {
            Ok(value) => return Ok(value),
            Err(error) if attempt + 1 < policy.max_attempts => {
                let delay = policy.delay_for(attempt);
                warn!(
                    network = %network,
                    %error,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "submission failed, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}

#[async_trait::async_trait]
impl ChainAdapter for SolanaChainAdapter {
    fn network_id(&self) -> &NetworkId {
        &self.network
    }

    fn family(&self) -> NetworkFamily {
        NetworkFamily::AccountLedger
    }

    fn operator_address(&self) -> String {
        self.keypair.pubkey().to_string()
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
enum SolanaTransferError {
    #[error("invalid recipient address '{0}'")]
    InvalidRecipient(String),
    #[error("invalid token mint address '{0}'")]
    InvalidMint(String),
    #[error(transparent)]
    Amount(#[from] TokenAmountError),
    #[error("amount does not fit the ledger's 64-bit token unit range")]
    AmountTooLarge,
    #[error("operator token balance {balance} below transfer amount {required}")]
    InsufficientBalance { balance: u64, required: u64 },
    #[error("transaction build failed: {0}")]
    Build(String),
    #[error(transparent)]
    Signer(#[from] SignerError),
    #[error("operator key is not a required signer of the compiled message")]
    MissingSigner,
    #[error("rpc error: {0}")]
    Rpc(Box<ClientErrorKind>),
    #[error("confirmation not reached within {}s", timeout.as_secs())]
    ConfirmationTimeout { timeout: Duration },
}

impl From<ClientError> for SolanaTransferError {
    fn from(value: ClientError) -> Self {
        SolanaTransferError::Rpc(value.kind)
    }
}

impl SolanaTransferError {
    fn kind(&self) -> TransferFailureKind {
        match self {
            SolanaTransferError::InvalidRecipient(_) => TransferFailureKind::InvalidAddress,
            SolanaTransferError::InsufficientBalance { .. } => {
                TransferFailureKind::InsufficientBalance
            }
            SolanaTransferError::Rpc(_) => TransferFailureKind::SubmissionFailure,
            SolanaTransferError::ConfirmationTimeout { .. } => {
                TransferFailureKind::ConfirmationTimeout
            }
            SolanaTransferError::InvalidMint(_)
            | SolanaTransferError::Amount(_)
            | SolanaTransferError::AmountTooLarge
            | SolanaTransferError::Build(_)
            | SolanaTransferError::Signer(_)
            | SolanaTransferError::MissingSigner => TransferFailureKind::Other,
        }
    }
}
