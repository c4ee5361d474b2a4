//! TokenDrop Keystore
//!
//! Loads and persists the attestation service's signing key. The key is a
//! scoped credential: it is read from disk once at startup, injected into
//! the attestation service, and never logged.

mod keypair;
mod paths;

pub use keypair::{load_or_generate_signer_keypair, KeystoreError};
pub use paths::{default_keystore_dir, expand_path};

pub type Error = KeystoreError;
