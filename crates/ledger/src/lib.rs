//! TokenDrop Ledger
//!
//! Off-chain bookkeeping for the attestation service:
//!
//! - [`EntitlementLedger`] — points earned per wallet address. The task
//!   catalog that produces these awards is an external collaborator; this
//!   crate only stores balances and hands them over atomically at
//!   attestation time.
//! - [`AttestationLog`] — every attestation ever issued, append-only, with
//!   the single permitted transition `Generated` → `Consumed`.
//!
//! Both stores are in-memory maps behind `RwLock`s, shared by handle the way
//! the settlement state is elsewhere in this workspace. Durability beyond
//! process lifetime is the embedding application's concern.

mod entitlement;
mod log;

pub use entitlement::EntitlementLedger;
pub use log::AttestationLog;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("No attestation found for user {0} at nonce {1}")]
    AttestationNotFound(alloy_primitives::Address, alloy_primitives::U256),

    #[error("Attestation for user {0} at nonce {1} already consumed")]
    AlreadyConsumed(alloy_primitives::Address, alloy_primitives::U256),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
