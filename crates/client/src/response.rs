//! Revert-reason classification and user-facing messages
//!
//! On-chain failures arrive as reason strings. The client maps the known
//! substrings to structured errors and shows a generic failure otherwise;
//! unknown strings are never retried blindly.

use crate::ClientError;

/// Coarse classification of a revert reason string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevertKind {
    /// Claims disabled or outside the claim window
    Inactive,
    /// Signature did not recover to the authorized signer
    InvalidSignature,
    /// Verifier's holding balance cannot cover the amount
    InsufficientContractBalance,
    /// Anything else
    Unknown,
}

/// Classify a revert reason by its known substrings.
pub fn classify_revert(reason: &str) -> RevertKind {
    if reason.contains("not active") || reason.contains("not started") || reason.contains("ended") {
        RevertKind::Inactive
    } else if reason.contains("Invalid signature") {
        RevertKind::InvalidSignature
    } else if reason.contains("Insufficient contract balance") {
        RevertKind::InsufficientContractBalance
    } else {
        RevertKind::Unknown
    }
}

/// Short user-facing message for a claim failure.
pub fn user_message(error: &ClientError) -> &'static str {
    match error {
        ClientError::InsufficientEntitlement { .. } => "Earn more points before claiming.",
        ClientError::OracleUnavailable(_) => "Temporary hiccup, please try again.",
        ClientError::AttestationRejected(_) => "Claim request was rejected.",
        ClientError::UnauthorizedClaim => "This claim is not authorized.",
        ClientError::AlreadyClaimed => "You already claimed these tokens.",
        ClientError::InactiveOrPaused => "The airdrop is not open right now.",
        ClientError::TransferFailed => "Server-side problem, the team has been notified.",
        ClientError::TransactionFailed(_) => "Claim failed, please try again later.",
    }
}
