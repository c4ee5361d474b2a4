//! Service keypair management

use std::fmt;

use alloy_primitives::{keccak256, Address};
use k256::ecdsa::{SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;

use crate::{CryptoError, Result};

/// The attestation service's signing keypair.
///
/// Wraps a secp256k1 secret key. The secret never leaves this type except
/// through [`SignerKeypair::secret_key_bytes`] (used by the keystore to
/// persist it); the `Debug` impl prints only the derived address.
pub struct SignerKeypair {
    signing_key: SigningKey,
}

impl SignerKeypair {
    /// Generate a fresh random keypair.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// Reconstruct a keypair from its 32-byte secret.
    pub fn from_secret_bytes(bytes: &[u8; 32]) -> Result<Self> {
        let signing_key =
            SigningKey::from_slice(bytes).map_err(|_| CryptoError::InvalidSecretKey)?;
        Ok(Self { signing_key })
    }

    /// The 32-byte secret key (for keystore persistence only).
    pub fn secret_key_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(self.signing_key.to_bytes().as_slice());
        out
    }

    /// The 20-byte address derived from the public key.
    ///
    /// This is the value configured into the verifier as the authorized
    /// signer.
    pub fn address(&self) -> Address {
        public_key_address(self.signing_key.verifying_key())
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl fmt::Debug for SignerKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignerKeypair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Derive the 20-byte address for a secp256k1 public key:
/// the last 20 bytes of keccak256 over the uncompressed point (without the
/// 0x04 tag byte).
pub fn public_key_address(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let digest = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&digest[12..])
}
