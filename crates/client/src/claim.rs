//! Claim orchestration

use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};
use tracing::{error, info, warn};

use tokendrop_attestation::{AttestationError, AttestationService, NonceOracle};
use tokendrop_chain::Chain;

use crate::response::{classify_revert, RevertKind};
use crate::{ClientError, Result};

/// What the wallet holder is asked to approve before the claim transaction
/// is submitted on their behalf.
#[derive(Debug, Clone, Copy)]
pub struct ClaimPrompt {
    pub amount: U256,
    pub nonce: U256,
}

/// The user's wallet: an address plus the approval prompt.
///
/// Declining the prompt cancels the claim; it is not an error and is never
/// retried automatically.
pub trait Wallet {
    fn address(&self) -> Address;
    fn approve_claim(&self, prompt: &ClaimPrompt) -> bool;
}

/// Result of a claim attempt that did not error.
#[derive(Debug, Clone)]
pub enum ClaimOutcome {
    /// Tokens released; the attestation is consumed
    Claimed {
        amount: U256,
        nonce: U256,
        tx_hash: B256,
        block: u64,
    },
    /// The wallet holder declined the prompt
    Cancelled,
}

/// High-level claim flow against one chain and one attestation service.
pub struct ClaimClient<O: NonceOracle> {
    service: Arc<AttestationService<O>>,
    chain: Chain,
}

impl<O: NonceOracle> ClaimClient<O> {
    pub fn new(service: Arc<AttestationService<O>>, chain: Chain) -> Self {
        Self { service, chain }
    }

    /// Run the full claim flow for `wallet`.
    ///
    /// Attestation request → wallet approval → on-chain claim → receipt.
    /// On success the attestation is marked consumed; on a stale-nonce
    /// rejection the outstanding record is also marked consumed, since the
    /// chain proves that nonce was already spent.
    pub async fn claim_tokens<W: Wallet>(&self, wallet: &W) -> Result<ClaimOutcome> {
        let user = wallet.address();
        let issued = self.service.issue_attestation(user).await.map_err(map_attestation_error)?;
        let attestation = issued.attestation;

        if issued.retry {
            info!("Resuming outstanding claim for {} (nonce {})", user, attestation.nonce);
        }

        let prompt = ClaimPrompt {
            amount: attestation.amount,
            nonce: attestation.nonce,
        };
        if !wallet.approve_claim(&prompt) {
            info!("Claim cancelled by {}", user);
            return Ok(ClaimOutcome::Cancelled);
        }

        let receipt = self
            .chain
            .submit_claim(user, attestation.amount, attestation.signature)
            .await;

        if receipt.success {
            if let Err(e) = self.service.mark_consumed(user, attestation.nonce) {
                warn!("Claim succeeded but consumption not recorded: {}", e);
            }
            info!(
                "Claim confirmed for {}: {} at nonce {} (tx {})",
                user, attestation.amount, attestation.nonce, receipt.tx_hash
            );
            return Ok(ClaimOutcome::Claimed {
                amount: attestation.amount,
                nonce: attestation.nonce,
                tx_hash: receipt.tx_hash,
                block: receipt.block,
            });
        }

        let reason = receipt.reason().to_string();
        match classify_revert(&reason) {
            RevertKind::Inactive => Err(ClientError::InactiveOrPaused),
            RevertKind::InsufficientContractBalance => {
                // Operationally fatal: the verifier needs a refill.
                error!(
                    "Claim for {} failed: verifier holding balance below {}",
                    user, attestation.amount
                );
                Err(ClientError::TransferFailed)
            }
            RevertKind::InvalidSignature => {
                // The verifier cannot tell a stale signature from a forged
                // one; distinguish here by re-reading the nonce.
                let on_chain = self
                    .chain
                    .current_nonce(user)
                    .await
                    .map_err(|e| ClientError::TransactionFailed(e.to_string()))?;
                if on_chain > attestation.nonce {
                    if let Err(e) = self.service.mark_consumed(user, attestation.nonce) {
                        warn!("Stale attestation could not be retired: {}", e);
                    }
                    Err(ClientError::AlreadyClaimed)
                } else {
                    Err(ClientError::UnauthorizedClaim)
                }
            }
            RevertKind::Unknown => Err(ClientError::TransactionFailed(reason)),
        }
    }
}

fn map_attestation_error(error: AttestationError) -> ClientError {
    match error {
        AttestationError::InsufficientEntitlement { have, need } => {
            ClientError::InsufficientEntitlement { have, need }
        }
        AttestationError::OracleUnavailable(msg) => ClientError::OracleUnavailable(msg),
        other => ClientError::AttestationRejected(other.to_string()),
    }
}
