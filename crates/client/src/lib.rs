//! TokenDrop Client
//!
//! Caller-facing claim flow: request an attestation from the signing
//! service, submit the on-chain claim transaction from the user's own
//! wallet, await the receipt, and surface success or a mapped failure.
//!
//! The client performs no verification of its own — the verifier contract
//! is the source of truth. What it does own is the failure taxonomy:
//! revert reason strings come back as structured [`ClientError`] values,
//! and a declined wallet prompt is a cancellation, not an error.

mod claim;
mod response;

pub use claim::{ClaimClient, ClaimOutcome, ClaimPrompt, Wallet};
pub use response::{classify_revert, user_message, RevertKind};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Insufficient entitlement: have {have} points, need at least {need}")]
    InsufficientEntitlement { have: u64, need: u64 },

    #[error("Attestation service temporarily unavailable: {0}")]
    OracleUnavailable(String),

    #[error("Attestation request rejected: {0}")]
    AttestationRejected(String),

    #[error("Invalid signature or unauthorized claim")]
    UnauthorizedClaim,

    #[error("Already claimed")]
    AlreadyClaimed,

    #[error("Airdrop is not active")]
    InactiveOrPaused,

    #[error("Token transfer failed: verifier balance insufficient")]
    TransferFailed,

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
