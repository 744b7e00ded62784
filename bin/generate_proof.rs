use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::OsRng;
use reserves_prover::{
    circuits::{generate_witness, ProofOfReservesCircuit},
    config::ReservesConfig,
    groth16::{create_proof, ProofArtifact, ProofMetadata, ProvingKey},
    r1cs::R1cs,
    utils::{
        encoding::{load_bincode, save_json},
        fp_to_decimal, ExchangeData,
    },
};

/// Proves that the exchange ledger adds up to the claimed reserves and includes one user
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration, the defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long, default_value = "data/exchange_data.json")]
    exchange_data: PathBuf,

    /// Index of the user whose inclusion is proven. Stays private.
    #[arg(short, long, default_value_t = 2)]
    user_index: usize,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = ReservesConfig::load(args.config.as_deref())?;
    let params = config.circuit_params()?;

    println!("═══════════════════════════════════════════════════════");
    println!("  🏦 Exchange: Generating Proof of Reserves");
    println!("═══════════════════════════════════════════════════════\n");

    let exchange_data = ExchangeData::load(&args.exchange_data).with_context(|| {
        format!(
            "Failed to load exchange data: {}",
            args.exchange_data.display()
        )
    })?;

    println!("📊 Exchange Data:");
    println!("   Total Users: {}", exchange_data.users.len());
    println!(
        "   Claimed Total Reserves: {}",
        exchange_data.total_reserves
    );
    println!(
        "   Public Wallet Address: {}",
        exchange_data.public_wallet_address
    );
    println!("\n👥 User Balances (PRIVATE - not revealed in proof):");
    for (i, user) in exchange_data.users.iter().enumerate() {
        println!("   User {}: {}", i, user.balance);
    }

    println!("\n   ✓ Actual sum: {}", exchange_data.actual_sum());
    exchange_data
        .check_consistency()
        .context("Internal error: Sum of balances does not match claimed total!")?;

    let request = exchange_data.proof_request(args.user_index)?;
    println!("\n🔐 Generating zero-knowledge proof...");
    println!(
        "   (Proving User {}'s balance of {} is included)",
        args.user_index, request.expected_balance
    );

    let pk: ProvingKey = load_bincode(config.proving_key_path()).with_context(|| {
        format!(
            "Failed to load proving key: {}, run the setup first",
            config.proving_key_path().display()
        )
    })?;
    let r1cs = R1cs::from_circuit(&ProofOfReservesCircuit::init_empty(params.clone())?)?;

    let witness = generate_witness(&params, &request)?;
    let proof = create_proof(&pk, &r1cs, &witness, OsRng)?;
    let public_signals: Vec<String> = witness.public_inputs().iter().map(fp_to_decimal).collect();
    drop(witness);

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("System clock is before the unix epoch")?
        .as_secs();
    let artifact = ProofArtifact {
        proof,
        public_signals,
        metadata: ProofMetadata {
            timestamp: timestamp.to_string(),
            claimed_total: exchange_data.total_reserves.to_string(),
            public_wallet_address: exchange_data.public_wallet_address.clone(),
            description: "Proof that exchange reserves match liabilities".to_owned(),
        },
    };
    save_json(config.proof_path(), &artifact)
        .with_context(|| format!("Failed to write {}", config.proof_path().display()))?;

    println!("\n✅ Proof generated successfully!");
    println!("\n📤 PUBLIC Information (shared with users):");
    println!("   • Claimed Total: {}", exchange_data.total_reserves);
    println!(
        "   • Wallet Address: {}",
        exchange_data.public_wallet_address
    );
    println!("   • Proof: {}", config.proof_path().display());
    println!("\n🔒 PRIVATE Information (never revealed):");
    println!("   • Individual user balances");
    println!("   • Which user's inclusion was proven");
    println!("   • Distribution of wealth");

    println!("\n═══════════════════════════════════════════════════════");
    println!("  Next step: Run \"cargo run --release --bin verify_proof\" to verify");
    println!("═══════════════════════════════════════════════════════\n");

    Ok(())
}
