//! Attestation issuance

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use alloy_primitives::{Address, U256};
use tracing::{info, warn};

use tokendrop_core::{Attestation, AttestationStatus};
use tokendrop_crypto::{sign_claim, SignerKeypair};
use tokendrop_ledger::{AttestationLog, EntitlementLedger};

use crate::oracle::NonceOracle;
use crate::{AttestationError, Result};

/// Issuance policy values.
///
/// These are configuration, not constants: the minimum threshold and the
/// optional per-claim cap are deployment decisions.
#[derive(Debug, Clone)]
pub struct IssuePolicy {
    /// Minimum points balance required to claim
    pub min_claim_points: u64,
    /// Optional upper bound on a single claim, in points. A balance above
    /// the cap is rejected outright — the ledger zeroes on issuance, so
    /// silently clamping would strand the remainder.
    pub max_claim_points: Option<u64>,
    /// Token decimals used to scale points into base units
    pub token_decimals: u8,
}

impl Default for IssuePolicy {
    fn default() -> Self {
        Self {
            min_claim_points: 10,
            max_claim_points: None,
            token_decimals: 18,
        }
    }
}

impl IssuePolicy {
    /// Scale a points balance into token base units.
    pub fn points_to_amount(&self, points: u64) -> U256 {
        U256::from(points) * U256::from(10u64).pow(U256::from(self.token_decimals))
    }
}

/// Issuance result: the attestation plus whether it was re-delivered.
#[derive(Debug, Clone)]
pub struct IssuedAttestation {
    pub attestation: Attestation,
    /// True when an outstanding record was returned instead of a fresh
    /// signature (the caller already held this authorization).
    pub retry: bool,
}

/// The attestation signer.
///
/// Holds the service key as a scoped credential injected at construction.
/// All issuance for one user runs inside a per-user critical section; calls
/// for different users proceed in parallel.
pub struct AttestationService<O: NonceOracle> {
    keypair: SignerKeypair,
    oracle: O,
    ledger: Arc<EntitlementLedger>,
    log: Arc<AttestationLog>,
    policy: IssuePolicy,
    user_locks: Mutex<HashMap<Address, Arc<tokio::sync::Mutex<()>>>>,
}

impl<O: NonceOracle> AttestationService<O> {
    pub fn new(
        keypair: SignerKeypair,
        oracle: O,
        ledger: Arc<EntitlementLedger>,
        log: Arc<AttestationLog>,
        policy: IssuePolicy,
    ) -> Self {
        info!(
            "Attestation service ready (signer: {}, min claim: {} points)",
            keypair.address(),
            policy.min_claim_points
        );
        Self {
            keypair,
            oracle,
            ledger,
            log,
            policy,
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    /// The address the verifier must be configured with.
    pub fn signer_address(&self) -> Address {
        self.keypair.address()
    }

    pub fn policy(&self) -> &IssuePolicy {
        &self.policy
    }

    /// Issue (or re-deliver) a claim authorization for `user`.
    ///
    /// The sequence inside the per-user critical section is ordered so that
    /// every fallible step happens before any mutation: an oracle outage or
    /// signing failure leaves the entitlement balance untouched, and the
    /// balance is zeroed only once the signature exists.
    pub async fn issue_attestation(&self, user: Address) -> Result<IssuedAttestation> {
        let lock = self.user_lock(user);
        let _guard = lock.lock().await;

        // One outstanding attestation per user: re-deliver rather than
        // signing a second authorization for the same nonce.
        if let Some(existing) = self.log.latest_generated(user) {
            info!(
                "Re-delivering outstanding attestation for {} (nonce {})",
                user, existing.nonce
            );
            return Ok(IssuedAttestation {
                attestation: existing,
                retry: true,
            });
        }

        let have = self.ledger.balance_of(user);
        if have < self.policy.min_claim_points {
            return Err(AttestationError::InsufficientEntitlement {
                have,
                need: self.policy.min_claim_points,
            });
        }
        if let Some(cap) = self.policy.max_claim_points {
            if have > cap {
                warn!("Claim request for {} rejected: {} points over cap {}", user, have, cap);
                return Err(AttestationError::AboveClaimCap { points: have, cap });
            }
        }

        let nonce = self
            .oracle
            .current_nonce(user)
            .await
            .map_err(|e| AttestationError::OracleUnavailable(e.to_string()))?;

        let amount = self.policy.points_to_amount(have);
        let signature = sign_claim(&self.keypair, user, amount, nonce)?;

        // Signature exists; now convert the balance. Points awarded between
        // the read above and this take stay on the ledger for the next cycle.
        let taken = self.ledger.take_all(user);
        if taken > have {
            self.ledger.award(user, taken - have);
        }

        let attestation = Attestation {
            user,
            points: have,
            amount,
            nonce,
            signature,
            status: AttestationStatus::Generated,
            issued_at: unix_now(),
        };
        self.log.insert(attestation.clone());

        info!(
            "Issued attestation for {}: {} points -> {} at nonce {}",
            user, have, amount, nonce
        );
        Ok(IssuedAttestation {
            attestation,
            retry: false,
        })
    }

    /// Record that the on-chain claim for (user, nonce) succeeded.
    pub fn mark_consumed(&self, user: Address, nonce: U256) -> Result<()> {
        self.log.mark_consumed(user, nonce)?;
        Ok(())
    }

    /// The most recent outstanding attestation for a user, if any.
    pub fn outstanding(&self, user: Address) -> Option<Attestation> {
        self.log.latest_generated(user)
    }

    fn user_lock(&self, user: Address) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.user_locks.lock().expect("user lock map poisoned");
        locks.entry(user).or_default().clone()
    }
}

fn unix_now() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

    use crate::oracle::{NonceOracle, OracleError};
    use tokendrop_crypto::verify_claim;

    /// Oracle over a shared counter, with a failure switch.
    #[derive(Default)]
    struct TestOracle {
        nonce: AtomicU64,
        fail: AtomicBool,
    }

    impl NonceOracle for Arc<TestOracle> {
        async fn current_nonce(&self, _user: Address) -> std::result::Result<U256, OracleError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(OracleError("nonce view unavailable".to_string()));
            }
            Ok(U256::from(self.nonce.load(Ordering::SeqCst)))
        }
    }

    fn addr(byte: u8) -> Address {
        Address::from([byte; 20])
    }

    fn service(
        policy: IssuePolicy,
    ) -> (AttestationService<Arc<TestOracle>>, Arc<TestOracle>, Arc<EntitlementLedger>) {
        let oracle = Arc::new(TestOracle::default());
        let ledger = Arc::new(EntitlementLedger::new());
        let log = Arc::new(AttestationLog::new());
        let svc = AttestationService::new(
            SignerKeypair::generate(),
            oracle.clone(),
            ledger.clone(),
            log,
            policy,
        );
        (svc, oracle, ledger)
    }

    #[tokio::test]
    async fn test_issue_signs_full_balance_and_zeroes() {
        let (svc, _, ledger) = service(IssuePolicy::default());
        let user = addr(1);
        ledger.award(user, 1000);

        let issued = svc.issue_attestation(user).await.unwrap();
        assert!(!issued.retry);

        let att = &issued.attestation;
        assert_eq!(att.points, 1000);
        assert_eq!(att.amount, U256::from(1000u64) * U256::from(10u64).pow(U256::from(18u64)));
        assert_eq!(att.nonce, U256::ZERO);
        assert!(verify_claim(
            svc.signer_address(),
            user,
            att.amount,
            att.nonce,
            &att.signature
        ));

        // Entitlement converted
        assert_eq!(ledger.balance_of(user), 0);
    }

    #[tokio::test]
    async fn test_below_threshold_rejected() {
        let (svc, _, ledger) = service(IssuePolicy::default());
        let user = addr(1);
        ledger.award(user, 9);

        let result = svc.issue_attestation(user).await;
        assert!(matches!(
            result,
            Err(AttestationError::InsufficientEntitlement { have: 9, need: 10 })
        ));

        // Nothing taken
        assert_eq!(ledger.balance_of(user), 9);
    }

    #[tokio::test]
    async fn test_cap_rejects_oversized_balance() {
        let policy = IssuePolicy {
            max_claim_points: Some(500),
            ..IssuePolicy::default()
        };
        let (svc, _, ledger) = service(policy);
        let user = addr(1);
        ledger.award(user, 501);

        let result = svc.issue_attestation(user).await;
        assert!(matches!(
            result,
            Err(AttestationError::AboveClaimCap { points: 501, cap: 500 })
        ));
        assert_eq!(ledger.balance_of(user), 501);
    }

    #[tokio::test]
    async fn test_oracle_outage_leaves_entitlement_untouched() {
        let (svc, oracle, ledger) = service(IssuePolicy::default());
        let user = addr(1);
        ledger.award(user, 100);

        oracle.fail.store(true, Ordering::SeqCst);
        let result = svc.issue_attestation(user).await;
        assert!(matches!(result, Err(AttestationError::OracleUnavailable(_))));
        assert_eq!(ledger.balance_of(user), 100);

        // Retry after the outage clears succeeds
        oracle.fail.store(false, Ordering::SeqCst);
        let issued = svc.issue_attestation(user).await.unwrap();
        assert_eq!(issued.attestation.points, 100);
    }

    #[tokio::test]
    async fn test_reissue_returns_same_attestation() {
        let (svc, _, ledger) = service(IssuePolicy::default());
        let user = addr(1);
        ledger.award(user, 1000);

        let first = svc.issue_attestation(user).await.unwrap();
        assert!(!first.retry);

        // Points are gone, but the outstanding record is re-delivered
        let second = svc.issue_attestation(user).await.unwrap();
        assert!(second.retry);
        assert_eq!(second.attestation.amount, first.attestation.amount);
        assert_eq!(second.attestation.nonce, first.attestation.nonce);
        assert_eq!(second.attestation.signature, first.attestation.signature);
    }

    #[tokio::test]
    async fn test_new_entitlement_waits_for_consumption() {
        let (svc, oracle, ledger) = service(IssuePolicy::default());
        let user = addr(1);
        ledger.award(user, 1000);

        let first = svc.issue_attestation(user).await.unwrap();

        // More points accrue while the first attestation is outstanding
        ledger.award(user, 50);
        let redelivered = svc.issue_attestation(user).await.unwrap();
        assert!(redelivered.retry);
        assert_eq!(redelivered.attestation.points, 1000);
        assert_eq!(ledger.balance_of(user), 50);

        // Once consumed, the next cycle picks up the new balance
        svc.mark_consumed(user, first.attestation.nonce).unwrap();
        oracle.nonce.store(1, Ordering::SeqCst);

        let next = svc.issue_attestation(user).await.unwrap();
        assert!(!next.retry);
        assert_eq!(next.attestation.points, 50);
        assert_eq!(next.attestation.nonce, U256::from(1u64));
    }

    #[tokio::test]
    async fn test_concurrent_issuance_yields_one_fresh_attestation() {
        let (svc, _, ledger) = service(IssuePolicy::default());
        let svc = Arc::new(svc);
        let user = addr(1);
        ledger.award(user, 1000);

        let a = tokio::spawn({
            let svc = svc.clone();
            async move { svc.issue_attestation(user).await.unwrap() }
        });
        let b = tokio::spawn({
            let svc = svc.clone();
            async move { svc.issue_attestation(user).await.unwrap() }
        });

        let (a, b) = (a.await.unwrap(), b.await.unwrap());

        // Exactly one of the two was a fresh signature, and both carry the
        // same authorization — the balance was converted once.
        assert_ne!(a.retry, b.retry);
        assert_eq!(a.attestation.signature, b.attestation.signature);
        assert_eq!(ledger.balance_of(user), 0);
    }

    #[test]
    fn test_points_scaling() {
        let policy = IssuePolicy::default();
        assert_eq!(
            policy.points_to_amount(1),
            U256::from(10u64).pow(U256::from(18u64))
        );

        let whole = IssuePolicy {
            token_decimals: 0,
            ..IssuePolicy::default()
        };
        assert_eq!(whole.points_to_amount(42), U256::from(42u64));
    }
}
