//! Chain-level types: genesis configuration, receipts, events, reverts

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

/// Revert reason carried by a failed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revert(pub String);

impl Revert {
    pub fn reason(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Revert {
    fn from(reason: &str) -> Self {
        Self(reason.to_string())
    }
}

impl std::fmt::Display for Revert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Genesis parameters for a fresh chain.
#[derive(Debug, Clone)]
pub struct GenesisConfig {
    /// Token name
    pub token_name: String,
    /// Token symbol
    pub token_symbol: String,
    /// Token decimals
    pub token_decimals: u8,
    /// Total token supply (base units), minted to `owner`
    pub total_supply: U256,
    /// Owner of the verifier contract (and recipient of the genesis supply)
    pub owner: Address,
    /// Authorized attestation signer address
    pub signer: Address,
}

impl GenesisConfig {
    /// Standard 18-decimals genesis with a 1M-token supply.
    pub fn new(owner: Address, signer: Address) -> Self {
        Self {
            token_name: "TokenDrop".to_string(),
            token_symbol: "TDR".to_string(),
            token_decimals: 18,
            total_supply: U256::from(1_000_000u64) * U256::from(10u64).pow(U256::from(18u64)),
            owner,
            signer,
        }
    }
}

/// Events emitted by the verifier contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainEvent {
    /// A claim succeeded. `nonce` is the value consumed by this claim
    /// (the counter the signature was bound to, before the increment).
    AirdropClaimed {
        user: Address,
        amount: U256,
        nonce: U256,
    },
    /// The authorized signer was replaced
    SignerUpdated { previous: Address, current: Address },
    /// Claims were activated or deactivated
    AirdropStatusChanged { active: bool },
    /// The claim window was set
    ClaimWindowChanged { start: u64, end: u64 },
    /// Remaining holding balance withdrawn to the owner
    EmergencyWithdraw { to: Address, amount: U256 },
}

impl ChainEvent {
    /// The claimer this event is indexed by, if it is a claim event.
    pub fn claimer(&self) -> Option<Address> {
        match self {
            ChainEvent::AirdropClaimed { user, .. } => Some(*user),
            _ => None,
        }
    }
}

/// Receipt for an executed transaction.
#[derive(Debug, Clone)]
pub struct TxReceipt {
    /// Transaction hash
    pub tx_hash: B256,
    /// Block height the transaction was included at
    pub block: u64,
    /// Whether the transaction succeeded
    pub success: bool,
    /// Revert reason for failed transactions
    pub revert_reason: Option<String>,
    /// Events emitted (empty for failed transactions)
    pub events: Vec<ChainEvent>,
}

impl TxReceipt {
    /// Convenience accessor for the revert reason.
    pub fn reason(&self) -> &str {
        self.revert_reason.as_deref().unwrap_or_default()
    }
}

/// Aggregate airdrop statistics for dashboards and operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AirdropStats {
    /// Total token amount released through claims
    pub total_claimed: U256,
    /// Distinct addresses that have claimed at least once
    pub participants: u64,
    /// Verifier's remaining holding balance
    pub remaining: U256,
    /// Whether claims are currently accepted
    pub active: bool,
}
