//! Claim message encoding
//!
//! A claim authorization is a signature over a deterministic digest of
//! (user address, token amount, nonce). The encoding is tightly packed with
//! a fixed field order and fixed-width integers:
//!
//! ```text
//! user (20 bytes) || amount (32 bytes, big-endian) || nonce (32 bytes, big-endian)
//! ```
//!
//! The packed bytes are hashed with keccak256, and the resulting 32-byte
//! message hash is wrapped in the EIP-191 personal-message envelope before
//! signing (the service signs with `signMessage` semantics). Changing any
//! field order, width, or the hash function invalidates every previously
//! issued signature, so this module is the one place the encoding lives.

use alloy_primitives::{keccak256, Address, B256, U256};

/// EIP-191 prefix for a 32-byte personal message.
const EIP191_PREFIX: &[u8; 28] = b"\x19Ethereum Signed Message:\n32";

/// Packed claim message length: 20-byte address + two 32-byte words.
pub const CLAIM_MESSAGE_LEN: usize = 20 + 32 + 32;

/// Pack (user, amount, nonce) into the fixed 84-byte claim message.
pub fn claim_message(user: Address, amount: U256, nonce: U256) -> [u8; CLAIM_MESSAGE_LEN] {
    let mut out = [0u8; CLAIM_MESSAGE_LEN];
    out[..20].copy_from_slice(user.as_slice());
    out[20..52].copy_from_slice(&amount.to_be_bytes::<32>());
    out[52..84].copy_from_slice(&nonce.to_be_bytes::<32>());
    out
}

/// keccak256 of the packed claim message.
pub fn claim_message_hash(user: Address, amount: U256, nonce: U256) -> B256 {
    keccak256(claim_message(user, amount, nonce))
}

/// Wrap a 32-byte message hash in the EIP-191 personal-message envelope.
pub fn eth_signed_message_hash(message_hash: B256) -> B256 {
    let mut buf = [0u8; EIP191_PREFIX.len() + 32];
    buf[..EIP191_PREFIX.len()].copy_from_slice(EIP191_PREFIX);
    buf[EIP191_PREFIX.len()..].copy_from_slice(message_hash.as_slice());
    keccak256(buf)
}

/// The digest that is actually signed and recovered against: the EIP-191
/// envelope over the packed claim message hash.
pub fn signed_claim_digest(user: Address, amount: U256, nonce: U256) -> B256 {
    eth_signed_message_hash(claim_message_hash(user, amount, nonce))
}
