//! Token ledger
//!
//! Minimal ERC-20-style balance accounting: a fixed supply minted at
//! genesis and moved around by `transfer`. Minting beyond genesis, approvals
//! and allowances are out of scope — the verifier only ever moves tokens out
//! of its own holding balance.

use std::collections::HashMap;

use alloy_primitives::{Address, U256};

use crate::types::Revert;

pub const ERR_TRANSFER_EXCEEDS_BALANCE: &str = "Transfer amount exceeds balance";

/// Fixed-supply token balances.
#[derive(Debug)]
pub struct TokenLedger {
    name: String,
    symbol: String,
    decimals: u8,
    total_supply: U256,
    balances: HashMap<Address, U256>,
}

impl TokenLedger {
    /// Mint `total_supply` to `recipient` at genesis.
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        decimals: u8,
        total_supply: U256,
        recipient: Address,
    ) -> Self {
        let mut balances = HashMap::new();
        balances.insert(recipient, total_supply);
        Self {
            name: name.into(),
            symbol: symbol.into(),
            decimals,
            total_supply,
            balances,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).copied().unwrap_or(U256::ZERO)
    }

    /// Move `amount` from `from` to `to`.
    ///
    /// Reverts without touching either balance if `from` holds less than
    /// `amount`.
    pub fn transfer(&mut self, from: Address, to: Address, amount: U256) -> Result<(), Revert> {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(Revert::from(ERR_TRANSFER_EXCEEDS_BALANCE));
        }

        self.balances.insert(from, from_balance - amount);
        let to_balance = self.balance_of(to);
        self.balances.insert(to, to_balance + amount);
        Ok(())
    }
}
