//! Nonce oracle
//!
//! Read-only view of the claim verifier's per-user nonce counter. The
//! attestation service binds each signature to the nonce reported here;
//! staleness is bounded by the freshness of the underlying chain view and
//! is an accepted risk — a signature issued against a stale nonce simply
//! fails verification and the user requests a fresh one.

use std::future::Future;

use alloy_primitives::{Address, U256};
use thiserror::Error;

use tokendrop_chain::Chain;

/// Failure to read the verifier's nonce counter. Transient by contract:
/// callers may retry the whole request, since nothing was mutated.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct OracleError(pub String);

/// Authoritative next-expected nonce for a user. No side effects.
pub trait NonceOracle: Send + Sync {
    fn current_nonce(
        &self,
        user: Address,
    ) -> impl Future<Output = Result<U256, OracleError>> + Send;
}

/// Oracle backed by the chain's verifier state.
#[derive(Clone)]
pub struct ChainNonceOracle {
    chain: Chain,
}

impl ChainNonceOracle {
    pub fn new(chain: Chain) -> Self {
        Self { chain }
    }
}

impl NonceOracle for ChainNonceOracle {
    async fn current_nonce(&self, user: Address) -> Result<U256, OracleError> {
        self.chain
            .current_nonce(user)
            .await
            .map_err(|e| OracleError(e.to_string()))
    }
}
