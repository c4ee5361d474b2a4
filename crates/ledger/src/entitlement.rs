//! Points balances per wallet address

use std::collections::HashMap;
use std::sync::RwLock;

use alloy_primitives::Address;
use tracing::debug;

/// Per-address entitlement balances.
///
/// Balances only move two ways: `award` accrues points (driven by task
/// completions upstream), and `take_all` reads-and-zeroes in one step when
/// an attestation is issued. The combined read-and-zero is what prevents the
/// same points from backing two attestations.
#[derive(Debug, Default)]
pub struct EntitlementLedger {
    balances: RwLock<HashMap<Address, u64>>,
}

impl EntitlementLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit points to a user
    pub fn award(&self, user: Address, points: u64) {
        let mut balances = self.balances.write().expect("entitlement lock poisoned");
        let balance = balances.entry(user).or_insert(0);
        *balance = balance.saturating_add(points);
        debug!("Awarded {} points to {} (balance: {})", points, user, balance);
    }

    /// Current points balance for a user
    pub fn balance_of(&self, user: Address) -> u64 {
        let balances = self.balances.read().expect("entitlement lock poisoned");
        balances.get(&user).copied().unwrap_or(0)
    }

    /// Atomically read and zero a user's balance.
    ///
    /// Returns the balance as it was at the moment of zeroing.
    pub fn take_all(&self, user: Address) -> u64 {
        let mut balances = self.balances.write().expect("entitlement lock poisoned");
        let taken = balances.insert(user, 0).unwrap_or(0);
        if taken > 0 {
            debug!("Zeroed {} points for {}", taken, user);
        }
        taken
    }
}
