use serde::{Deserialize, Serialize};
use serde_big_array::BigArray;

use alloy_primitives::{Address, U256};

/// 65-byte recoverable signature: `r || s || v`, with `v` in {27, 28}
/// (use BigArray for serde support)
pub type ClaimSignature = [u8; 65];

/// Lifecycle of an issued attestation.
///
/// Records are immutable except for the single transition
/// `Generated` → `Consumed`, set once the on-chain claim is observed to
/// succeed. A record can stay `Generated` forever if the client never
/// reports success; that is what makes idempotent re-delivery possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttestationStatus {
    /// Signed and handed out, not yet observed on-chain
    Generated,
    /// The matching claim transaction succeeded on-chain
    Consumed,
}

/// An off-chain-issued authorization for one on-chain claim.
///
/// The signature covers (user, amount, nonce) via the encoding in
/// [`crate::message`]; it is valid only while `nonce` equals the verifier's
/// current counter for `user`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attestation {
    /// Claiming wallet address (embedded in the signed message)
    pub user: Address,
    /// Entitlement points converted into this attestation
    pub points: u64,
    /// Authorized token amount in base units (points scaled by decimals)
    pub amount: U256,
    /// Verifier nonce this signature is bound to
    pub nonce: U256,
    /// Recoverable signature from the service key
    #[serde(with = "BigArray")]
    pub signature: ClaimSignature,
    /// Current lifecycle state
    pub status: AttestationStatus,
    /// Unix timestamp (seconds) of issuance
    pub issued_at: u64,
}

impl Attestation {
    /// Whether this attestation is still waiting to be consumed on-chain.
    pub fn is_outstanding(&self) -> bool {
        self.status == AttestationStatus::Generated
    }
}
