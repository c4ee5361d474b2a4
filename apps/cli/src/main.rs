//! TokenDrop CLI
//!
//! Operator tooling for the signature-authorized claim platform: signer key
//! management, claim digest and signature inspection, and a self-contained
//! end-to-end demo against the embedded chain.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use alloy_primitives::{Address, U256};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use tokendrop_attestation::{AttestationService, ChainNonceOracle, IssuePolicy};
use tokendrop_chain::{Chain, GenesisConfig};
use tokendrop_client::{user_message, ClaimClient, ClaimOutcome, ClaimPrompt, Wallet};
use tokendrop_core::{claim_message_hash, signed_claim_digest, ClaimSignature};
use tokendrop_crypto::{recover_signer, sign_claim};
use tokendrop_keystore::load_or_generate_signer_keypair;
use tokendrop_ledger::{AttestationLog, EntitlementLedger};
use tokendrop_logging::LogLevel;

/// TokenDrop - Signature-authorized token claims
#[derive(Parser)]
#[command(name = "tokendrop")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the signer keyfile
    #[arg(long, default_value = "~/.tokendrop/signer.key")]
    keyfile: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load or generate the signer key and print its address
    Keygen,

    /// Print the claim message hash and signed digest for a triple
    Digest {
        /// Claiming wallet address (hex)
        user: String,
        /// Token amount in base units
        amount: String,
        /// Verifier nonce
        nonce: String,
    },

    /// Sign a claim with the keystore key
    Sign {
        /// Claiming wallet address (hex)
        user: String,
        /// Token amount in base units
        amount: String,
        /// Verifier nonce
        nonce: String,
    },

    /// Recover the signer of a claim signature
    Verify {
        /// Claiming wallet address (hex)
        user: String,
        /// Token amount in base units
        amount: String,
        /// Verifier nonce
        nonce: String,
        /// 65-byte signature (hex)
        signature: String,
        /// Expected signer address (hex)
        #[arg(long)]
        signer: Option<String>,
    },

    /// Run the full claim flow against an embedded chain
    Demo {
        /// Points awarded to the demo user
        #[arg(long, default_value = "1000")]
        points: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    tokendrop_logging::init(LogLevel::from_verbose(cli.verbose));

    match cli.command {
        Commands::Keygen => {
            let keypair = load_or_generate_signer_keypair(&cli.keyfile)?;
            println!("Signer address: {}", keypair.address());
        }

        Commands::Digest { user, amount, nonce } => {
            let (user, amount, nonce) = parse_claim(&user, &amount, &nonce)?;
            println!("Message hash:  {}", claim_message_hash(user, amount, nonce));
            println!("Signed digest: {}", signed_claim_digest(user, amount, nonce));
        }

        Commands::Sign { user, amount, nonce } => {
            let (user, amount, nonce) = parse_claim(&user, &amount, &nonce)?;
            let keypair = load_or_generate_signer_keypair(&cli.keyfile)?;
            let signature = sign_claim(&keypair, user, amount, nonce)?;
            println!("Signer:    {}", keypair.address());
            println!("Signature: 0x{}", hex_encode(&signature));
        }

        Commands::Verify {
            user,
            amount,
            nonce,
            signature,
            signer,
        } => {
            let (user, amount, nonce) = parse_claim(&user, &amount, &nonce)?;
            let signature = parse_signature(&signature)?;
            let digest = signed_claim_digest(user, amount, nonce);

            match recover_signer(digest, &signature) {
                Some(recovered) => {
                    println!("Recovered signer: {}", recovered);
                    if let Some(expected) = signer {
                        let expected = parse_address(&expected)?;
                        if recovered == expected {
                            println!("Signature is valid for {}", expected);
                        } else {
                            bail!("Signature recovers to {recovered}, expected {expected}");
                        }
                    }
                }
                None => bail!("Signature is malformed and cannot be recovered"),
            }
        }

        Commands::Demo { points } => run_demo(points).await?,
    }

    Ok(())
}

/// Wallet that approves every prompt (demo only).
struct AutoApproveWallet(Address);

impl Wallet for AutoApproveWallet {
    fn address(&self) -> Address {
        self.0
    }

    fn approve_claim(&self, prompt: &ClaimPrompt) -> bool {
        info!("Wallet approving claim of {} at nonce {}", prompt.amount, prompt.nonce);
        true
    }
}

/// Boot an embedded chain, award points, and run one full claim cycle.
async fn run_demo(points: u64) -> Result<()> {
    let owner = Address::from([0xEE; 20]);
    let user = Address::from([0x01; 20]);

    let keypair = tokendrop_crypto::SignerKeypair::generate();
    let chain = Chain::new(GenesisConfig::new(owner, keypair.address()));

    let policy = IssuePolicy::default();
    let funding = policy.points_to_amount(400_000);
    anyhow::ensure!(chain.fund_airdrop(owner, funding).await.success, "funding failed");
    anyhow::ensure!(chain.set_active(owner, true).await.success, "activation failed");

    let ledger = Arc::new(EntitlementLedger::new());
    let service = Arc::new(AttestationService::new(
        keypair,
        ChainNonceOracle::new(chain.clone()),
        ledger.clone(),
        Arc::new(AttestationLog::new()),
        policy,
    ));
    let client = ClaimClient::new(service, chain.clone());

    ledger.award(user, points);
    println!("Awarded {points} points to {user}");

    match client.claim_tokens(&AutoApproveWallet(user)).await {
        Ok(ClaimOutcome::Claimed {
            amount,
            nonce,
            tx_hash,
            ..
        }) => {
            println!("Claimed {amount} at nonce {nonce} (tx {tx_hash})");
        }
        Ok(ClaimOutcome::Cancelled) => println!("Claim cancelled"),
        Err(e) => bail!("Claim failed: {} ({})", e, user_message(&e)),
    }

    let stats = chain.stats().await;
    println!(
        "Stats: claimed {} across {} participants, {} remaining",
        stats.total_claimed, stats.participants, stats.remaining
    );
    Ok(())
}

fn parse_claim(user: &str, amount: &str, nonce: &str) -> Result<(Address, U256, U256)> {
    Ok((
        parse_address(user)?,
        U256::from_str(amount).with_context(|| format!("invalid amount: {amount}"))?,
        U256::from_str(nonce).with_context(|| format!("invalid nonce: {nonce}"))?,
    ))
}

fn parse_address(raw: &str) -> Result<Address> {
    Address::from_str(raw).with_context(|| format!("invalid address: {raw}"))
}

fn parse_signature(raw: &str) -> Result<ClaimSignature> {
    let stripped = raw.strip_prefix("0x").unwrap_or(raw);
    let bytes = hex_decode(stripped)?;
    if bytes.len() != 65 {
        bail!("expected a 65-byte signature, got {} bytes", bytes.len());
    }
    let mut signature = [0u8; 65];
    signature.copy_from_slice(&bytes);
    Ok(signature)
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn hex_decode(raw: &str) -> Result<Vec<u8>> {
    if raw.len() % 2 != 0 {
        bail!("hex string has odd length");
    }
    (0..raw.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&raw[i..i + 2], 16)
                .with_context(|| format!("invalid hex at offset {i}"))
        })
        .collect()
}
