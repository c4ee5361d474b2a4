//! Claim verifier state machine
//!
//! The authoritative record of who has claimed what. Per user it keeps one
//! monotonically increasing nonce counter, starting at 0 and never reset.
//! A claim signature is bound to one specific nonce value: consuming the
//! nonce permanently invalidates the signature (and any other signature
//! issued for that nonce), which closes the replay window without a
//! separate used-signature set.
//!
//! Every mutation is guarded by checks that run before any state changes,
//! so a revert leaves the verifier and the token ledger exactly as they
//! were.

use std::collections::HashMap;

use alloy_primitives::{Address, U256};
use tracing::{info, warn};

use tokendrop_core::{signed_claim_digest, ClaimSignature};
use tokendrop_crypto::recover_signer;

use crate::token::TokenLedger;
use crate::types::{AirdropStats, ChainEvent, Revert};

pub const ERR_NOT_ACTIVE: &str = "Airdrop is not active";
pub const ERR_NOT_STARTED: &str = "Airdrop has not started";
pub const ERR_ALREADY_ENDED: &str = "Airdrop has ended";
pub const ERR_INVALID_SIGNATURE: &str = "Invalid signature or unauthorized claim";
pub const ERR_INSUFFICIENT_BALANCE: &str = "Insufficient contract balance";
pub const ERR_NOT_OWNER: &str = "Caller is not the owner";

/// The on-chain claim verifier contract.
#[derive(Debug)]
pub struct ClaimVerifier {
    /// The contract's own account on the token ledger (holding balance)
    address: Address,
    /// Owner allowed to run administrative transitions
    owner: Address,
    /// Address whose signatures authorize claims
    signer: Address,
    /// Whether claims are administratively enabled
    active: bool,
    /// Claim window start (unix seconds; 0 = no lower bound)
    claim_start: u64,
    /// Claim window end (unix seconds; 0 = no upper bound)
    claim_end: u64,
    /// Per-user nonce counters
    nonces: HashMap<Address, U256>,
    /// Total amount released through claims
    total_claimed: U256,
    /// Distinct addresses that have claimed at least once
    participants: u64,
}

impl ClaimVerifier {
    pub fn new(address: Address, owner: Address, signer: Address) -> Self {
        Self {
            address,
            owner,
            signer,
            active: false,
            claim_start: 0,
            claim_end: 0,
            nonces: HashMap::new(),
            total_claimed: U256::ZERO,
            participants: 0,
        }
    }

    /// The contract's holding account address.
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    /// The configured authorized signer.
    pub fn signer(&self) -> Address {
        self.signer
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Current nonce for a user (0 if the user has never claimed).
    pub fn nonce_of(&self, user: Address) -> U256 {
        self.nonces.get(&user).copied().unwrap_or(U256::ZERO)
    }

    /// Aggregate statistics over the token ledger.
    pub fn stats(&self, token: &TokenLedger) -> AirdropStats {
        AirdropStats {
            total_claimed: self.total_claimed,
            participants: self.participants,
            remaining: token.balance_of(self.address),
            active: self.active,
        }
    }

    // ==================== Claim ====================

    /// Verify and execute a claim from `sender`.
    ///
    /// The digest is recomputed over (sender, amount, current nonce) with
    /// the shared encoding, so a signature can only ever pay out to the
    /// address it embeds, for the amount it embeds, at the nonce it embeds.
    pub fn claim(
        &mut self,
        token: &mut TokenLedger,
        sender: Address,
        amount: U256,
        signature: &ClaimSignature,
        now: u64,
    ) -> Result<ChainEvent, Revert> {
        if !self.active {
            return Err(Revert::from(ERR_NOT_ACTIVE));
        }
        if self.claim_start != 0 && now < self.claim_start {
            return Err(Revert::from(ERR_NOT_STARTED));
        }
        if self.claim_end != 0 && now > self.claim_end {
            return Err(Revert::from(ERR_ALREADY_ENDED));
        }

        let nonce = self.nonce_of(sender);
        let digest = signed_claim_digest(sender, amount, nonce);
        match recover_signer(digest, signature) {
            Some(recovered) if recovered == self.signer => {}
            _ => return Err(Revert::from(ERR_INVALID_SIGNATURE)),
        }

        if token.balance_of(self.address) < amount {
            warn!(
                "Claim for {} of {} rejected: holding balance too low",
                sender, amount
            );
            return Err(Revert::from(ERR_INSUFFICIENT_BALANCE));
        }

        // All checks passed; effects are now infallible. The transfer and
        // the nonce increment land together or not at all.
        token
            .transfer(self.address, sender, amount)
            .map_err(|_| Revert::from(ERR_INSUFFICIENT_BALANCE))?;

        if nonce.is_zero() {
            self.participants += 1;
        }
        self.nonces.insert(sender, nonce + U256::from(1u64));
        self.total_claimed += amount;

        info!("Claim succeeded: {} received {} (nonce {})", sender, amount, nonce);
        Ok(ChainEvent::AirdropClaimed {
            user: sender,
            amount,
            nonce,
        })
    }

    // ==================== Administrative transitions ====================

    fn only_owner(&self, caller: Address) -> Result<(), Revert> {
        if caller != self.owner {
            return Err(Revert::from(ERR_NOT_OWNER));
        }
        Ok(())
    }

    /// Replace the authorized signer (key rotation).
    pub fn set_signer(&mut self, caller: Address, new_signer: Address) -> Result<ChainEvent, Revert> {
        self.only_owner(caller)?;
        let previous = self.signer;
        self.signer = new_signer;
        info!("Authorized signer rotated: {} -> {}", previous, new_signer);
        Ok(ChainEvent::SignerUpdated {
            previous,
            current: new_signer,
        })
    }

    /// Enable or disable claims.
    pub fn set_active(&mut self, caller: Address, active: bool) -> Result<ChainEvent, Revert> {
        self.only_owner(caller)?;
        self.active = active;
        info!("Airdrop active flag set to {}", active);
        Ok(ChainEvent::AirdropStatusChanged { active })
    }

    /// Set the claim window. Either bound may be 0 for "unbounded".
    pub fn set_claim_window(
        &mut self,
        caller: Address,
        start: u64,
        end: u64,
    ) -> Result<ChainEvent, Revert> {
        self.only_owner(caller)?;
        self.claim_start = start;
        self.claim_end = end;
        Ok(ChainEvent::ClaimWindowChanged { start, end })
    }

    /// Withdraw the entire remaining holding balance to the owner.
    pub fn emergency_withdraw(
        &mut self,
        token: &mut TokenLedger,
        caller: Address,
    ) -> Result<ChainEvent, Revert> {
        self.only_owner(caller)?;
        let amount = token.balance_of(self.address);
        token.transfer(self.address, self.owner, amount)?;
        warn!("Emergency withdraw of {} to owner {}", amount, self.owner);
        Ok(ChainEvent::EmergencyWithdraw {
            to: self.owner,
            amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;
    use tokendrop_crypto::{sign_claim, SignerKeypair};

    fn addr(byte: u8) -> Address {
        Address::from([byte; 20])
    }

    struct Fixture {
        verifier: ClaimVerifier,
        token: TokenLedger,
        keypair: SignerKeypair,
    }

    /// Verifier holding 10_000 tokens, active, unbounded window.
    fn fixture() -> Fixture {
        let keypair = SignerKeypair::generate();
        let owner = addr(0xEE);
        let contract = addr(0xCC);
        let mut token = TokenLedger::new("Test", "TST", 18, U256::from(100_000u64), owner);
        token.transfer(owner, contract, U256::from(10_000u64)).unwrap();

        let mut verifier = ClaimVerifier::new(contract, owner, keypair.address());
        verifier.set_active(owner, true).unwrap();

        Fixture {
            verifier,
            token,
            keypair,
        }
    }

    fn signed(fx: &Fixture, user: Address, amount: U256, nonce: U256) -> ClaimSignature {
        sign_claim(&fx.keypair, user, amount, nonce).unwrap()
    }

    #[test]
    fn test_valid_claim_transfers_and_advances_nonce() {
        let mut fx = fixture();
        let user = addr(1);
        let amount = U256::from(1000u64);
        let sig = signed(&fx, user, amount, U256::ZERO);

        let event = fx
            .verifier
            .claim(&mut fx.token, user, amount, &sig, 100)
            .unwrap();

        assert_eq!(
            event,
            ChainEvent::AirdropClaimed {
                user,
                amount,
                nonce: U256::ZERO
            }
        );
        assert_eq!(fx.token.balance_of(user), amount);
        assert_eq!(fx.verifier.nonce_of(user), U256::from(1u64));
    }

    #[test]
    fn test_replay_rejected() {
        let mut fx = fixture();
        let user = addr(1);
        let amount = U256::from(1000u64);
        let sig = signed(&fx, user, amount, U256::ZERO);

        fx.verifier
            .claim(&mut fx.token, user, amount, &sig, 100)
            .unwrap();

        // Same (amount, signature) again: nonce is now 1, digest differs
        let result = fx.verifier.claim(&mut fx.token, user, amount, &sig, 100);
        assert_eq!(result, Err(Revert::from(ERR_INVALID_SIGNATURE)));

        // Balance unchanged by the failed replay
        assert_eq!(fx.token.balance_of(user), amount);
        assert_eq!(fx.verifier.nonce_of(user), U256::from(1u64));
    }

    #[test]
    fn test_forged_signer_rejected_without_state_change() {
        let mut fx = fixture();
        let user = addr(1);
        let amount = U256::from(1000u64);

        let forger = SignerKeypair::generate();
        let sig = sign_claim(&forger, user, amount, U256::ZERO).unwrap();

        let result = fx.verifier.claim(&mut fx.token, user, amount, &sig, 100);
        assert_eq!(result, Err(Revert::from(ERR_INVALID_SIGNATURE)));
        assert_eq!(fx.verifier.nonce_of(user), U256::ZERO);
        assert_eq!(fx.token.balance_of(user), U256::ZERO);
    }

    #[test]
    fn test_cross_user_rejected() {
        let mut fx = fixture();
        let alice = addr(1);
        let mallory = addr(2);
        let amount = U256::from(1000u64);

        // Signature authorizes alice; mallory submits it
        let sig = signed(&fx, alice, amount, U256::ZERO);
        let result = fx.verifier.claim(&mut fx.token, mallory, amount, &sig, 100);
        assert_eq!(result, Err(Revert::from(ERR_INVALID_SIGNATURE)));
    }

    #[test]
    fn test_amount_tampering_rejected() {
        let mut fx = fixture();
        let user = addr(1);

        let sig = signed(&fx, user, U256::from(500u64), U256::ZERO);
        let result = fx
            .verifier
            .claim(&mut fx.token, user, U256::from(600u64), &sig, 100);
        assert_eq!(result, Err(Revert::from(ERR_INVALID_SIGNATURE)));
    }

    #[test]
    fn test_forged_amount_at_later_nonce_rejected() {
        let mut fx = fixture();
        let user = addr(1);

        // Walk the user's nonce up to 3
        for _ in 0..3 {
            let nonce = fx.verifier.nonce_of(user);
            let sig = signed(&fx, user, U256::from(100u64), nonce);
            fx.verifier
                .claim(&mut fx.token, user, U256::from(100u64), &sig, 100)
                .unwrap();
        }
        assert_eq!(fx.verifier.nonce_of(user), U256::from(3u64));

        // Legitimate attestation at nonce 3 is for 500; a forged signature
        // for 600 at the same nonce must not pass.
        let forger = SignerKeypair::generate();
        let forged = sign_claim(&forger, user, U256::from(600u64), U256::from(3u64)).unwrap();
        let result = fx
            .verifier
            .claim(&mut fx.token, user, U256::from(600u64), &forged, 100);
        assert_eq!(result, Err(Revert::from(ERR_INVALID_SIGNATURE)));

        // The real one still works
        let sig = signed(&fx, user, U256::from(500u64), U256::from(3u64));
        fx.verifier
            .claim(&mut fx.token, user, U256::from(500u64), &sig, 100)
            .unwrap();
    }

    #[test]
    fn test_nonce_monotonicity() {
        let mut fx = fixture();
        let user = addr(1);

        for expected in 0u64..5 {
            assert_eq!(fx.verifier.nonce_of(user), U256::from(expected));
            let sig = signed(&fx, user, U256::from(10u64), U256::from(expected));
            fx.verifier
                .claim(&mut fx.token, user, U256::from(10u64), &sig, 100)
                .unwrap();
        }
        assert_eq!(fx.verifier.nonce_of(user), U256::from(5u64));
    }

    #[test]
    fn test_drained_contract_leaves_nonce_unchanged() {
        let mut fx = fixture();
        let user = addr(1);

        // Drain the holding balance
        fx.verifier
            .emergency_withdraw(&mut fx.token, fx.verifier.owner())
            .unwrap();

        let sig = signed(&fx, user, U256::from(1000u64), U256::ZERO);
        let result = fx
            .verifier
            .claim(&mut fx.token, user, U256::from(1000u64), &sig, 100);
        assert_eq!(result, Err(Revert::from(ERR_INSUFFICIENT_BALANCE)));

        // Atomicity: nonce must not have advanced
        assert_eq!(fx.verifier.nonce_of(user), U256::ZERO);
        assert_eq!(fx.token.balance_of(user), U256::ZERO);
    }

    #[test]
    fn test_inactive_rejects_claims() {
        let mut fx = fixture();
        let owner = fx.verifier.owner();
        fx.verifier.set_active(owner, false).unwrap();

        let user = addr(1);
        let sig = signed(&fx, user, U256::from(10u64), U256::ZERO);
        let result = fx.verifier.claim(&mut fx.token, user, U256::from(10u64), &sig, 100);
        assert_eq!(result, Err(Revert::from(ERR_NOT_ACTIVE)));
    }

    #[test]
    fn test_claim_window_enforced() {
        let mut fx = fixture();
        let owner = fx.verifier.owner();
        fx.verifier.set_claim_window(owner, 1000, 2000).unwrap();

        let user = addr(1);
        let sig = signed(&fx, user, U256::from(10u64), U256::ZERO);

        let early = fx.verifier.claim(&mut fx.token, user, U256::from(10u64), &sig, 500);
        assert_eq!(early, Err(Revert::from(ERR_NOT_STARTED)));

        let late = fx.verifier.claim(&mut fx.token, user, U256::from(10u64), &sig, 3000);
        assert_eq!(late, Err(Revert::from(ERR_ALREADY_ENDED)));

        fx.verifier
            .claim(&mut fx.token, user, U256::from(10u64), &sig, 1500)
            .unwrap();
    }

    #[test]
    fn test_stats_track_claims() {
        let mut fx = fixture();
        let holding_before = fx.token.balance_of(fx.verifier.address());

        for (byte, amount) in [(1u8, 100u64), (2, 200)] {
            let user = addr(byte);
            let sig = signed(&fx, user, U256::from(amount), U256::ZERO);
            fx.verifier
                .claim(&mut fx.token, user, U256::from(amount), &sig, 100)
                .unwrap();
        }

        // Second claim by the same user should not bump participants
        let sig = signed(&fx, addr(1), U256::from(50u64), U256::from(1u64));
        fx.verifier
            .claim(&mut fx.token, addr(1), U256::from(50u64), &sig, 100)
            .unwrap();

        let stats = fx.verifier.stats(&fx.token);
        assert_eq!(stats.total_claimed, U256::from(350u64));
        assert_eq!(stats.participants, 2);
        assert_eq!(stats.remaining, holding_before - U256::from(350u64));
        assert!(stats.active);
    }

    #[test]
    fn test_only_owner_gates_admin() {
        let mut fx = fixture();
        let stranger = addr(0x99);

        assert_eq!(
            fx.verifier.set_active(stranger, false),
            Err(Revert::from(ERR_NOT_OWNER))
        );
        assert_eq!(
            fx.verifier.set_signer(stranger, addr(5)),
            Err(Revert::from(ERR_NOT_OWNER))
        );
        assert_eq!(
            fx.verifier.set_claim_window(stranger, 0, 0),
            Err(Revert::from(ERR_NOT_OWNER))
        );
        assert_eq!(
            fx.verifier.emergency_withdraw(&mut fx.token, stranger),
            Err(Revert::from(ERR_NOT_OWNER))
        );
    }

    #[test]
    fn test_signer_rotation_invalidates_old_key() {
        let mut fx = fixture();
        let owner = fx.verifier.owner();
        let user = addr(1);
        let amount = U256::from(100u64);

        let old_sig = signed(&fx, user, amount, U256::ZERO);

        let replacement = SignerKeypair::generate();
        fx.verifier.set_signer(owner, replacement.address()).unwrap();

        // Old key no longer authorizes
        let result = fx.verifier.claim(&mut fx.token, user, amount, &old_sig, 100);
        assert_eq!(result, Err(Revert::from(ERR_INVALID_SIGNATURE)));

        // New key does
        let new_sig = sign_claim(&replacement, user, amount, U256::ZERO).unwrap();
        fx.verifier
            .claim(&mut fx.token, user, amount, &new_sig, 100)
            .unwrap();
    }

    #[test]
    fn test_emergency_withdraw_drains_to_owner() {
        let mut fx = fixture();
        let owner = fx.verifier.owner();
        let holding = fx.token.balance_of(fx.verifier.address());
        let owner_before = fx.token.balance_of(owner);

        let event = fx.verifier.emergency_withdraw(&mut fx.token, owner).unwrap();
        assert_eq!(
            event,
            ChainEvent::EmergencyWithdraw {
                to: owner,
                amount: holding
            }
        );
        assert_eq!(fx.token.balance_of(fx.verifier.address()), U256::ZERO);
        assert_eq!(fx.token.balance_of(owner), owner_before + holding);
    }
}
