use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use reserves_prover::{
    config::ReservesConfig,
    groth16::{verify_artifact, ProofArtifact, VerifyingKey},
    utils::encoding::load_json,
};

/// Verifies a published proof of reserves against the verification key
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration, the defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides the proof path of the configuration
    #[arg(short, long)]
    proof: Option<PathBuf>,

    /// Overrides the verification key path of the configuration
    #[arg(short, long)]
    verification_key: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = ReservesConfig::load(args.config.as_deref())?;

    println!("═══════════════════════════════════════════════════════");
    println!("  👤 User: Verifying Proof of Reserves");
    println!("═══════════════════════════════════════════════════════\n");

    let proof_path = args.proof.unwrap_or_else(|| config.proof_path());
    let vk_path = args
        .verification_key
        .unwrap_or_else(|| config.verification_key_path());

    let artifact: ProofArtifact = load_json(&proof_path)
        .with_context(|| format!("Failed to load proof: {}", proof_path.display()))?;
    let vk_json = std::fs::read_to_string(&vk_path)
        .with_context(|| format!("Failed to read verification key: {}", vk_path.display()))?;
    let vk = VerifyingKey::from_json(&vk_json)?;
    ensure!(
        vk.n_public == 2,
        "Verification key expects {} public signals, a proof of reserves has 2",
        vk.n_public
    );

    println!("📋 Proof Metadata:");
    println!("   Timestamp: {}", artifact.metadata.timestamp);
    println!(
        "   Wallet Address: {}",
        artifact.metadata.public_wallet_address
    );
    println!("   Circuit Digest: {}", vk.circuit_digest_hex());

    println!("\n🔍 Verifying zero-knowledge proof...");
    let verified = verify_artifact(&vk, &artifact)?;
    let claimed_total = &artifact.public_signals[0];
    println!("\n📤 Public Signals:");
    println!("   Claimed Total: {}", claimed_total);
    println!("   Expected Balance: {}", artifact.public_signals[1]);

    println!("\n═══════════════════════════════════════════════════════");
    if verified {
        println!("  ✅ PROOF VALID!");
        println!("═══════════════════════════════════════════════════════");
        println!("\n✓ What this proof guarantees:");
        println!("  1. All user balances are NON-NEGATIVE (no negative balances)");
        println!("  2. Sum of all balances EQUALS the claimed total");
        println!("  3. The specific user's balance IS INCLUDED in the total");
        println!("\n✓ What remains PRIVATE:");
        println!("  • Individual user balance amounts");
        println!("  • Which user's inclusion was proven");
        println!("  • Distribution of balances");
        println!("\n🔐 Zero-Knowledge Property:");
        println!("  The exchange proved solvency WITHOUT revealing sensitive data!");

        println!("\n📊 Additional Verification Steps (for users):");
        println!("  1. Check the blockchain to verify the exchange's wallet");
        println!(
            "     address ({})",
            artifact.metadata.public_wallet_address
        );
        println!("     actually contains {}", claimed_total);
        println!("  2. Verify your own balance is correctly reflected");
        println!("  3. Check that the proof timestamp is recent");
    } else {
        println!("  ❌ PROOF INVALID!");
        println!("═══════════════════════════════════════════════════════");
        println!("\n⚠️  Warning: The exchange's proof of reserves is invalid!");
        println!("   This could mean:");
        println!("   • The sum of balances does not match claimed total");
        println!("   • There are negative balances");
        println!("   • The proof was tampered with");
    }
    println!("\n═══════════════════════════════════════════════════════\n");

    Ok(())
}
