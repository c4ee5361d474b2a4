//! Signer keypair persistence

use std::path::Path;

use thiserror::Error;
use tracing::info;

use tokendrop_crypto::SignerKeypair;

use crate::paths::expand_path;

#[derive(Error, Debug)]
pub enum KeystoreError {
    #[error("Failed to read keyfile: {0}")]
    ReadError(std::io::Error),

    #[error("Failed to write keyfile: {0}")]
    WriteError(std::io::Error),

    #[error("Invalid keyfile format: {0}")]
    InvalidFormat(String),

    #[error("Failed to create directory: {0}")]
    CreateDirError(std::io::Error),
}

/// Load an existing signer keypair from disk, or generate a new one
///
/// The keypair is stored as the 32-byte secp256k1 secret key. Only the
/// derived signer address is ever logged.
///
/// # Arguments
///
/// * `keyfile` - Path to the keyfile (supports `~` expansion)
///
/// # Returns
///
/// The loaded or newly generated signer keypair
pub fn load_or_generate_signer_keypair(keyfile: &Path) -> Result<SignerKeypair, KeystoreError> {
    let path = expand_path(keyfile);

    // Create parent directory if needed
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(KeystoreError::CreateDirError)?;
        }
    }

    // Try to load existing keypair
    if path.exists() {
        let bytes = std::fs::read(&path).map_err(KeystoreError::ReadError)?;
        if bytes.len() != 32 {
            return Err(KeystoreError::InvalidFormat(format!(
                "Expected 32 bytes, got {}",
                bytes.len()
            )));
        }
        let mut key_bytes = [0u8; 32];
        key_bytes.copy_from_slice(&bytes);
        let keypair = SignerKeypair::from_secret_bytes(&key_bytes)
            .map_err(|e| KeystoreError::InvalidFormat(e.to_string()))?;
        info!(
            "Loaded existing signer keypair from {:?} (signer: {})",
            path,
            keypair.address()
        );
        return Ok(keypair);
    }

    // Generate new keypair
    let keypair = SignerKeypair::generate();
    let bytes = keypair.secret_key_bytes();

    std::fs::write(&path, bytes).map_err(KeystoreError::WriteError)?;

    info!(
        "Generated new signer keypair, saved to {:?} (signer: {})",
        path,
        keypair.address()
    );
    Ok(keypair)
}
