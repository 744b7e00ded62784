use ark_std::{end_timer, start_timer};
use halo2_proofs::halo2curves::bn256::Fr as Fp;
use rand::rngs::OsRng;

use crate::ceremony::{Phase2, PowersOfTau};
use crate::errors::{ProverError, SetupError, VerifierError};
use crate::groth16::{create_proof, verify_proof, Proof, ProvingKey, VerifyingKey};
use crate::r1cs::{Circuit, R1cs, Witness};

/// Lays out `circuit` and derives its key pair from `phase1`.
///
/// Without a phase-1 accumulator a single-contributor ceremony of our own is run, which is only
/// fit for testing: whoever runs it knows the toxic waste.
pub fn generate_setup_artifacts<C: Circuit>(
    power: u32,
    phase1: Option<PowersOfTau>,
    circuit: &C,
) -> Result<(R1cs, ProvingKey, VerifyingKey), SetupError> {
    let timer = start_timer!(|| "Generating setup artifacts");
    let r1cs = R1cs::from_circuit(circuit)?;

    let ptau = match phase1 {
        Some(ptau) => ptau,
        None => {
            log::warn!(
                "powers of tau not provided, running a single-contributor ceremony of our own"
            );
            PowersOfTau::new(power)?.contribute("local", OsRng)?
        }
    };
    let prepared = ptau.prepare_phase2()?;
    let (pk, vk) = Phase2::initialize(&r1cs, &prepared)?
        .contribute("local", OsRng)?
        .finalize(&r1cs, &prepared)?;
    end_timer!(timer);

    Ok((r1cs, pk, vk))
}

pub fn full_prover(pk: &ProvingKey, r1cs: &R1cs, witness: &Witness) -> Result<Proof, ProverError> {
    let pf_time = start_timer!(|| "Creating proof");
    let proof = create_proof(pk, r1cs, witness, OsRng)?;
    end_timer!(pf_time);
    Ok(proof)
}

pub fn full_verifier(
    vk: &VerifyingKey,
    proof: &Proof,
    public_inputs: &[Fp],
) -> Result<bool, VerifierError> {
    verify_proof(vk, public_inputs, proof)
}
