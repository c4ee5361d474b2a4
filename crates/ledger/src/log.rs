//! Attestation log
//!
//! Append-only record of every attestation the service has issued. Records
//! never change except for the `Generated` → `Consumed` transition, applied
//! once the client observes the matching on-chain claim succeed.

use std::collections::HashMap;
use std::sync::RwLock;

use alloy_primitives::{Address, U256};
use tracing::{debug, info};

use tokendrop_core::{Attestation, AttestationStatus};

use crate::{LedgerError, Result};

/// Store of issued attestations, keyed by user.
#[derive(Debug, Default)]
pub struct AttestationLog {
    records: RwLock<HashMap<Address, Vec<Attestation>>>,
}

impl AttestationLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a freshly issued attestation
    pub fn insert(&self, attestation: Attestation) {
        let mut records = self.records.write().expect("attestation log lock poisoned");
        debug!(
            "Recorded attestation for {} (amount: {}, nonce: {})",
            attestation.user, attestation.amount, attestation.nonce
        );
        records.entry(attestation.user).or_default().push(attestation);
    }

    /// The most recent still-Generated attestation for a user, if any.
    ///
    /// This is the record re-delivered when the user asks again before the
    /// outstanding claim is consumed.
    pub fn latest_generated(&self, user: Address) -> Option<Attestation> {
        let records = self.records.read().expect("attestation log lock poisoned");
        records
            .get(&user)?
            .iter()
            .rev()
            .find(|a| a.is_outstanding())
            .cloned()
    }

    /// Mark the attestation at (user, nonce) as consumed.
    pub fn mark_consumed(&self, user: Address, nonce: U256) -> Result<()> {
        let mut records = self.records.write().expect("attestation log lock poisoned");
        let record = records
            .get_mut(&user)
            .and_then(|list| list.iter_mut().find(|a| a.nonce == nonce))
            .ok_or(LedgerError::AttestationNotFound(user, nonce))?;

        if record.status == AttestationStatus::Consumed {
            return Err(LedgerError::AlreadyConsumed(user, nonce));
        }

        record.status = AttestationStatus::Consumed;
        info!("Attestation consumed for {} at nonce {}", user, nonce);
        Ok(())
    }

    /// All attestations issued to a user, oldest first.
    pub fn history(&self, user: Address) -> Vec<Attestation> {
        let records = self.records.read().expect("attestation log lock poisoned");
        records.get(&user).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attestation(user_byte: u8, nonce: u64) -> Attestation {
        Attestation {
            user: Address::from([user_byte; 20]),
            points: 100,
            amount: U256::from(100u64),
            nonce: U256::from(nonce),
            signature: [0u8; 65],
            status: AttestationStatus::Generated,
            issued_at: 1_700_000_000,
        }
    }

    #[test]
    fn test_empty_log() {
        let log = AttestationLog::new();
        assert!(log.latest_generated(Address::from([1u8; 20])).is_none());
        assert!(log.history(Address::from([1u8; 20])).is_empty());
    }

    #[test]
    fn test_insert_and_latest_generated() {
        let log = AttestationLog::new();
        let att = attestation(1, 0);
        log.insert(att.clone());

        let found = log.latest_generated(att.user).unwrap();
        assert_eq!(found.nonce, att.nonce);
        assert_eq!(found.status, AttestationStatus::Generated);
    }

    #[test]
    fn test_mark_consumed() {
        let log = AttestationLog::new();
        let att = attestation(1, 0);
        log.insert(att.clone());

        log.mark_consumed(att.user, att.nonce).unwrap();

        // No longer outstanding
        assert!(log.latest_generated(att.user).is_none());
        assert_eq!(log.history(att.user)[0].status, AttestationStatus::Consumed);

        // Double-consume is an error
        assert!(matches!(
            log.mark_consumed(att.user, att.nonce),
            Err(LedgerError::AlreadyConsumed(_, _))
        ));
    }

    #[test]
    fn test_mark_consumed_unknown() {
        let log = AttestationLog::new();
        let result = log.mark_consumed(Address::from([9u8; 20]), U256::ZERO);
        assert!(matches!(result, Err(LedgerError::AttestationNotFound(_, _))));
    }

    #[test]
    fn test_latest_generated_skips_consumed() {
        let log = AttestationLog::new();
        let first = attestation(1, 0);
        let second = attestation(1, 1);
        log.insert(first.clone());
        log.insert(second.clone());

        log.mark_consumed(second.user, second.nonce).unwrap();

        // nonce-0 record is still outstanding and should be found
        let found = log.latest_generated(first.user).unwrap();
        assert_eq!(found.nonce, U256::ZERO);
    }

    #[test]
    fn test_history_preserves_order() {
        let log = AttestationLog::new();
        log.insert(attestation(1, 0));
        log.insert(attestation(1, 1));
        log.insert(attestation(1, 2));

        let history = log.history(Address::from([1u8; 20]));
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].nonce, U256::from(0u64));
        assert_eq!(history[2].nonce, U256::from(2u64));
    }
}
