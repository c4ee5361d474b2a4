//! TokenDrop Attestation
//!
//! The attestation-issuing service: converts an authorized (user, amount)
//! pair into a recoverable signature proving authorization, without ever
//! allowing forgery or reuse.
//!
//! ## Issuance contract
//!
//! - The claimed amount is always the user's full current entitlement at the
//!   instant of issuance, never a caller-chosen value.
//! - The signature is bound to the verifier's current nonce for the user,
//!   fetched through the [`NonceOracle`].
//! - Issuance per user is serialized; two concurrent requests cannot both
//!   convert the same balance (lost-update prevention).
//! - While one attestation is outstanding (Generated), further requests
//!   re-deliver the existing record instead of signing a second one for the
//!   same nonce.
//! - The nonce fetch happens before any mutation: an oracle outage rejects
//!   the request with the entitlement balance untouched.

mod oracle;
mod service;

pub use oracle::{ChainNonceOracle, NonceOracle, OracleError};
pub use service::{AttestationService, IssuePolicy, IssuedAttestation};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AttestationError {
    #[error("Insufficient entitlement: have {have} points, need at least {need}")]
    InsufficientEntitlement { have: u64, need: u64 },

    #[error("Balance of {points} points exceeds the per-claim cap of {cap}")]
    AboveClaimCap { points: u64, cap: u64 },

    #[error("Nonce oracle unavailable: {0}")]
    OracleUnavailable(String),

    #[error("Signing failed: {0}")]
    SigningFailed(#[from] tokendrop_crypto::CryptoError),

    #[error(transparent)]
    Ledger(#[from] tokendrop_ledger::LedgerError),
}

pub type Result<T> = std::result::Result<T, AttestationError>;
