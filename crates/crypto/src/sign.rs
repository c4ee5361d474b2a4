use alloy_primitives::{Address, B256, U256};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};

use tokendrop_core::{signed_claim_digest, ClaimSignature};

use crate::keys::{public_key_address, SignerKeypair};
use crate::{CryptoError, Result};

/// Sign a 32-byte digest, producing a recoverable `r || s || v` signature
/// with `v` in {27, 28}.
pub fn sign_digest(keypair: &SignerKeypair, digest: B256) -> Result<ClaimSignature> {
    let (signature, recovery_id) = keypair
        .signing_key()
        .sign_prehash_recoverable(digest.as_slice())
        .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

    let mut out = [0u8; 65];
    out[..64].copy_from_slice(signature.to_bytes().as_slice());
    out[64] = 27 + recovery_id.to_byte();
    Ok(out)
}

/// Recover the signer address from a signature over a digest.
///
/// Returns `None` for malformed signatures (bad `v`, non-canonical `r`/`s`)
/// rather than erroring: an unrecoverable signature is simply not a valid
/// authorization.
pub fn recover_signer(digest: B256, signature: &ClaimSignature) -> Option<Address> {
    let v = signature[64];
    if v != 27 && v != 28 {
        return None;
    }
    let recovery_id = RecoveryId::from_byte(v - 27)?;
    let signature = Signature::from_slice(&signature[..64]).ok()?;

    let key = VerifyingKey::recover_from_prehash(digest.as_slice(), &signature, recovery_id).ok()?;
    Some(public_key_address(&key))
}

/// Sign a claim authorization for (user, amount, nonce).
pub fn sign_claim(
    keypair: &SignerKeypair,
    user: Address,
    amount: U256,
    nonce: U256,
) -> Result<ClaimSignature> {
    sign_digest(keypair, signed_claim_digest(user, amount, nonce))
}

/// Check that a claim signature for (user, amount, nonce) recovers to the
/// expected signer address.
pub fn verify_claim(
    expected_signer: Address,
    user: Address,
    amount: U256,
    nonce: U256,
    signature: &ClaimSignature,
) -> bool {
    match recover_signer(signed_claim_digest(user, amount, nonce), signature) {
        Some(recovered) => recovered == expected_signer,
        None => false,
    }
}
