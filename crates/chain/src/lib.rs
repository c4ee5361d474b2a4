//! TokenDrop Chain
//!
//! Embedded execution environment for the claim verifier.
//!
//! ## Claim Flow
//!
//! 1. **Fund**: The owner transfers tokens from the genesis allocation into
//!    the verifier's holding balance.
//! 2. **Activate**: The owner opens the claim window and flips the active
//!    flag.
//! 3. **Claim**: A user submits `claim(amount, signature)`. The verifier
//!    recomputes the claim digest over (sender, amount, current nonce),
//!    recovers the signer, and — only if it matches the authorized signer —
//!    transfers `amount` and advances the nonce, atomically.
//! 4. **Observe**: Each successful claim emits an `AirdropClaimed` event
//!    indexed by claimer.
//!
//! Transactions execute serially against the chain state: a transaction
//! either applies all of its effects or none of them, and no partial
//! interleaving is observable. Failed transactions return a receipt carrying
//! the revert reason string and mutate nothing.

mod node;
mod token;
mod types;
mod verifier;

pub use node::Chain;
pub use token::TokenLedger;
pub use types::{AirdropStats, ChainEvent, GenesisConfig, Revert, TxReceipt};
pub use verifier::{
    ClaimVerifier, ERR_ALREADY_ENDED, ERR_INSUFFICIENT_BALANCE, ERR_INVALID_SIGNATURE,
    ERR_NOT_ACTIVE, ERR_NOT_OWNER, ERR_NOT_STARTED,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("Nonce query failed: {0}")]
    NonceQueryFailed(String),

    #[error("State query failed: {0}")]
    QueryFailed(String),
}

pub type Result<T> = std::result::Result<T, ChainError>;
