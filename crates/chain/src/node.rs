//! Chain node: serial transaction execution over the verifier and token state
//!
//! Mirrors the host chain's execution model: each submitted transaction runs
//! to completion against the shared state while holding the state lock, so
//! the verifier's read-check-increment-transfer sequence is atomic per call.
//! Concurrent submissions from the same user race only at ordering time;
//! whichever lands first wins and the loser fails signature validation
//! against the advanced nonce.

use std::sync::{Arc, RwLock};

use alloy_primitives::{keccak256, Address, B256, U256};
use tracing::{debug, info};

use tokendrop_core::ClaimSignature;

use crate::token::TokenLedger;
use crate::types::{AirdropStats, ChainEvent, GenesisConfig, Revert, TxReceipt};
use crate::verifier::ClaimVerifier;
use crate::{ChainError, Result};

struct ChainState {
    token: TokenLedger,
    verifier: ClaimVerifier,
    /// Block height, bumped once per executed transaction
    height: u64,
    /// Transaction counter for hash generation
    tx_counter: u64,
    /// Full event history with inclusion heights
    event_log: Vec<(u64, ChainEvent)>,
    /// Fixed timestamp for tests (None = wall clock)
    timestamp_override: Option<u64>,
    /// Fault injection: make nonce queries fail (oracle-outage tests)
    fail_nonce_queries: bool,
}

/// Handle to an embedded chain. Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct Chain {
    state: Arc<RwLock<ChainState>>,
}

impl Chain {
    /// Boot a chain from genesis: mint the token supply to the owner and
    /// deploy the verifier with the configured authorized signer.
    pub fn new(genesis: GenesisConfig) -> Self {
        let contract = verifier_contract_address();
        let token = TokenLedger::new(
            genesis.token_name.clone(),
            genesis.token_symbol.clone(),
            genesis.token_decimals,
            genesis.total_supply,
            genesis.owner,
        );
        let verifier = ClaimVerifier::new(contract, genesis.owner, genesis.signer);

        info!(
            "Chain booted: token {} ({}), verifier at {}, signer {}",
            token.name(),
            token.symbol(),
            contract,
            genesis.signer
        );

        Self {
            state: Arc::new(RwLock::new(ChainState {
                token,
                verifier,
                height: 0,
                tx_counter: 0,
                event_log: Vec::new(),
                timestamp_override: None,
                fail_nonce_queries: false,
            })),
        }
    }

    // ==================== Transactions ====================

    /// Submit a claim transaction from `sender`.
    pub async fn submit_claim(
        &self,
        sender: Address,
        amount: U256,
        signature: ClaimSignature,
    ) -> TxReceipt {
        debug!("Claim submitted by {} for {}", sender, amount);
        self.execute(move |state, now| {
            let ChainState { token, verifier, .. } = state;
            verifier
                .claim(token, sender, amount, &signature, now)
                .map(|event| vec![event])
        })
    }

    /// Transfer tokens into the verifier's holding balance.
    pub async fn fund_airdrop(&self, from: Address, amount: U256) -> TxReceipt {
        self.execute(move |state, _| {
            let to = state.verifier.address();
            state.token.transfer(from, to, amount)?;
            info!("Verifier funded with {} from {}", amount, from);
            Ok(Vec::new())
        })
    }

    /// Replace the authorized signer (owner only).
    pub async fn set_signer(&self, caller: Address, new_signer: Address) -> TxReceipt {
        self.execute(move |state, _| state.verifier.set_signer(caller, new_signer).map(|e| vec![e]))
    }

    /// Enable or disable claims (owner only).
    pub async fn set_active(&self, caller: Address, active: bool) -> TxReceipt {
        self.execute(move |state, _| state.verifier.set_active(caller, active).map(|e| vec![e]))
    }

    /// Set the claim window (owner only).
    pub async fn set_claim_window(&self, caller: Address, start: u64, end: u64) -> TxReceipt {
        self.execute(move |state, _| {
            state
                .verifier
                .set_claim_window(caller, start, end)
                .map(|e| vec![e])
        })
    }

    /// Withdraw the remaining holding balance to the owner (owner only).
    pub async fn emergency_withdraw(&self, caller: Address) -> TxReceipt {
        self.execute(move |state, _| {
            let ChainState { token, verifier, .. } = state;
            verifier.emergency_withdraw(token, caller).map(|e| vec![e])
        })
    }

    // ==================== Read-only accessors ====================

    /// The verifier's current nonce for a user.
    ///
    /// This is the read the nonce oracle is built on; it can fail when the
    /// underlying view is unavailable, which callers must treat as
    /// transient.
    pub async fn current_nonce(&self, user: Address) -> Result<U256> {
        let state = self.state.read().expect("chain lock poisoned");
        if state.fail_nonce_queries {
            return Err(ChainError::NonceQueryFailed(
                "nonce view unavailable".to_string(),
            ));
        }
        Ok(state.verifier.nonce_of(user))
    }

    /// The configured authorized signer address.
    pub async fn signer_address(&self) -> Address {
        self.state.read().expect("chain lock poisoned").verifier.signer()
    }

    /// Whether claims are administratively enabled.
    pub async fn is_active(&self) -> bool {
        self.state.read().expect("chain lock poisoned").verifier.is_active()
    }

    /// The verifier contract's holding account address.
    pub async fn verifier_address(&self) -> Address {
        self.state.read().expect("chain lock poisoned").verifier.address()
    }

    /// Token balance of an arbitrary account.
    pub async fn balance_of(&self, account: Address) -> U256 {
        self.state.read().expect("chain lock poisoned").token.balance_of(account)
    }

    /// Aggregate airdrop statistics.
    pub async fn stats(&self) -> AirdropStats {
        let state = self.state.read().expect("chain lock poisoned");
        state.verifier.stats(&state.token)
    }

    /// All claim events for one claimer (the event's indexed field).
    pub async fn claim_events(&self, user: Address) -> Vec<ChainEvent> {
        let state = self.state.read().expect("chain lock poisoned");
        state
            .event_log
            .iter()
            .filter(|(_, event)| event.claimer() == Some(user))
            .map(|(_, event)| event.clone())
            .collect()
    }

    /// Current block height.
    pub async fn height(&self) -> u64 {
        self.state.read().expect("chain lock poisoned").height
    }

    // ==================== Test & ops helpers ====================

    /// Pin the chain clock to a fixed timestamp (claim-window tests).
    pub fn set_timestamp(&self, now: u64) {
        self.state.write().expect("chain lock poisoned").timestamp_override = Some(now);
    }

    /// Toggle nonce-query fault injection (oracle-outage tests).
    pub fn set_nonce_query_fault(&self, fail: bool) {
        self.state.write().expect("chain lock poisoned").fail_nonce_queries = fail;
    }

    // ==================== Internals ====================

    /// Run one transaction atomically: the closure either returns events
    /// (all effects applied) or a revert (no effects applied — closures
    /// must not mutate before their last fallible step).
    fn execute<F>(&self, f: F) -> TxReceipt
    where
        F: FnOnce(&mut ChainState, u64) -> std::result::Result<Vec<ChainEvent>, Revert>,
    {
        let mut state = self.state.write().expect("chain lock poisoned");
        let now = state.timestamp_override.unwrap_or_else(wall_clock);

        state.height += 1;
        state.tx_counter += 1;
        let tx_hash = generate_tx_hash(state.tx_counter);
        let block = state.height;

        match f(&mut *state, now) {
            Ok(events) => {
                for event in &events {
                    state.event_log.push((block, event.clone()));
                }
                TxReceipt {
                    tx_hash,
                    block,
                    success: true,
                    revert_reason: None,
                    events,
                }
            }
            Err(revert) => {
                debug!("Transaction reverted at height {}: {}", block, revert);
                TxReceipt {
                    tx_hash,
                    block,
                    success: false,
                    revert_reason: Some(revert.0),
                    events: Vec::new(),
                }
            }
        }
    }
}

/// Deterministic address for the verifier's holding account.
fn verifier_contract_address() -> Address {
    let digest = keccak256(b"tokendrop/claim-verifier");
    Address::from_slice(&digest[12..])
}

fn generate_tx_hash(counter: u64) -> B256 {
    let mut buf = [0u8; 20];
    buf[..8].copy_from_slice(&counter.to_be_bytes());
    buf[8..].copy_from_slice(b"tokendroptx!");
    keccak256(buf)
}

fn wall_clock() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_secs()
}
