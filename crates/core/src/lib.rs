//! TokenDrop Core
//!
//! Shared types and the claim message encoding used by every other crate.
//!
//! The single most important thing in this crate is [`message`]: the
//! byte-exact encoding of a claim over which the attestation service signs
//! and against which the claim verifier recovers the signer. Both sides call
//! the same functions, so the wire format cannot drift between them.

pub mod message;
mod types;

pub use alloy_primitives::{Address, B256, U256};
pub use message::{
    claim_message, claim_message_hash, eth_signed_message_hash, signed_claim_digest,
    CLAIM_MESSAGE_LEN,
};
pub use types::{Attestation, AttestationStatus, ClaimSignature};
