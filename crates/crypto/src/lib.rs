//! TokenDrop Crypto
//!
//! Recoverable secp256k1 signing over claim digests.
//!
//! The attestation service holds one [`SignerKeypair`]; the verifier holds
//! only the matching 20-byte address. A signature is 65 bytes (`r || s || v`)
//! and carries enough information to recover the signer address from the
//! digest alone, which is what lets the verifier check authorization without
//! storing a public key.

mod keys;
mod sign;

pub use keys::{public_key_address, SignerKeypair};
pub use sign::{recover_signer, sign_claim, sign_digest, verify_claim};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Invalid secret key bytes")]
    InvalidSecretKey,

    #[error("Signing failed: {0}")]
    SigningFailed(String),
}

pub type Result<T> = std::result::Result<T, CryptoError>;
