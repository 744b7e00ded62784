use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use reserves_prover::{
    ceremony::{contributor_rng, Phase2, PowersOfTau},
    circuits::ProofOfReservesCircuit,
    config::ReservesConfig,
    r1cs::R1cs,
    utils::encoding::{save_bincode, save_json},
};

/// Runs the two phase trusted setup for the proof of reserves circuit and writes the keys
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration, the defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Extra entropy mixed into every contribution
    #[arg(short, long, default_value = "random entropy")]
    entropy: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = ReservesConfig::load(args.config.as_deref())?;
    let params = config.circuit_params()?;

    println!("═══════════════════════════════════════════════════════");
    println!("  zk-SNARK Proof of Reserves - Setup");
    println!("═══════════════════════════════════════════════════════\n");

    fs::create_dir_all(&config.artifacts.build_dir).with_context(|| {
        format!(
            "Failed to create build directory: {}",
            config.artifacts.build_dir.display()
        )
    })?;

    println!("🔧 Laying out the circuit...");
    let circuit = ProofOfReservesCircuit::init_empty(params.clone())?;
    let r1cs = R1cs::from_circuit(&circuit)?;
    println!("{}", r1cs.info());
    println!("# of Users: {}", params.n_users);
    println!("# of Balance Bits: {}", params.balance_bits);
    println!("Circuit Digest: {}", r1cs.digest_hex());

    println!(
        "\n🔧 Starting Powers of Tau ceremony (2^{})...",
        config.ceremony.power
    );
    let mut ptau = PowersOfTau::new(config.ceremony.power)?;
    for i in 0..config.ceremony.phase1_contributions {
        let name = format!("Phase 1 contribution #{}", i + 1);
        let rng = contributor_rng(&format!("{}/phase1/{}", args.entropy, i));
        ptau = ptau.contribute(&name, rng)?;
        println!("✅ {}: {}", name, hex::encode(ptau.digest()));
    }
    save_bincode(config.ptau_path(), &ptau)
        .with_context(|| format!("Failed to write {}", config.ptau_path().display()))?;

    println!("\n🔧 Preparing Phase 2...");
    let prepared = ptau.prepare_phase2()?;

    println!("\n🔧 Generating proving key...");
    let mut phase2 = Phase2::initialize(&r1cs, &prepared)?;
    for i in 0..config.ceremony.phase2_contributions {
        let name = format!("Phase 2 contribution #{}", i + 1);
        let rng = contributor_rng(&format!("{}/phase2/{}", args.entropy, i));
        phase2 = phase2.contribute(&name, rng)?;
        println!("✅ {}: {}", name, hex::encode(phase2.digest()));
    }

    println!("\n🔧 Exporting keys...");
    let (pk, vk) = phase2.finalize(&r1cs, &prepared)?;
    save_bincode(config.proving_key_path(), &pk).with_context(|| {
        format!("Failed to write {}", config.proving_key_path().display())
    })?;
    save_json(config.verification_key_path(), &vk).with_context(|| {
        format!(
            "Failed to write {}",
            config.verification_key_path().display()
        )
    })?;

    println!("\n═══════════════════════════════════════════════════════");
    println!("  ✅ Setup Complete!");
    println!("═══════════════════════════════════════════════════════");
    println!("\nGenerated files:");
    println!("  📄 {} - Powers of tau", config.ptau_path().display());
    println!("  🔑 {} - Proving key", config.proving_key_path().display());
    println!(
        "  🔑 {} - Verification key",
        config.verification_key_path().display()
    );
    println!("\nNext step: Run \"cargo run --release --bin generate_proof\" to generate a proof\n");

    Ok(())
}
