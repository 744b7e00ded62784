use ark_std::{end_timer, start_timer};
use halo2_proofs::{
    arithmetic::best_multiexp,
    halo2curves::{
        bn256::{Bn256, Fr as Fp, G1},
        group::Curve,
        pairing::Engine,
    },
};

use super::keys::VerifyingKey;
use super::proof::{Proof, ProofArtifact};
use crate::errors::VerifierError;
use crate::utils::decimal_to_fp;

/// Checks `e(A, B) = e(α, β) · e(Σ x_i·IC_i, γ) · e(C, δ)` for the public signals `x`.
///
/// `Ok(false)` means the proof does not hold for these signals, which is the expected answer for
/// a dishonest or insolvent prover. Errors are reserved for inputs that cannot be checked at all.
pub fn verify_proof(
    vk: &VerifyingKey,
    public_signals: &[Fp],
    proof: &Proof,
) -> Result<bool, VerifierError> {
    vk.validate()?;
    if public_signals.len() != vk.n_public {
        return Err(VerifierError::PublicSignalCount {
            expected: vk.n_public,
            actual: public_signals.len(),
        });
    }

    let timer = start_timer!(|| "Verifying Groth16 proof");
    let acc: G1 = best_multiexp(public_signals, &vk.ic[1..]) + vk.ic[0];

    // Gt is written additively
    let lhs = Bn256::pairing(&proof.a, &proof.b);
    let rhs = Bn256::pairing(&vk.alpha_g1, &vk.beta_g2)
        + Bn256::pairing(&acc.to_affine(), &vk.gamma_g2)
        + Bn256::pairing(&proof.c, &vk.delta_g2);
    end_timer!(timer);

    let verified = lhs == rhs;
    log::debug!("proof verification returned {}", verified);
    Ok(verified)
}

/// Parses the public signals of an artifact and verifies its proof.
///
/// A signal that is not the canonical decimal form of a field element is malformed input, and so
/// is metadata whose claimed total differs from the first public signal.
pub fn verify_artifact(vk: &VerifyingKey, artifact: &ProofArtifact) -> Result<bool, VerifierError> {
    let signals = parse_public_signals(&artifact.public_signals)?;
    if let Some(total) = signals.first() {
        let claimed = &artifact.metadata.claimed_total;
        if decimal_to_fp(claimed) != Some(*total) {
            return Err(VerifierError::ClaimedTotalMismatch {
                metadata: claimed.clone(),
                signal: artifact.public_signals[0].clone(),
            });
        }
    }
    verify_proof(vk, &signals, &artifact.proof)
}

pub fn parse_public_signals(signals: &[String]) -> Result<Vec<Fp>, VerifierError> {
    signals
        .iter()
        .enumerate()
        .map(|(index, value)| {
            decimal_to_fp(value).ok_or_else(|| VerifierError::MalformedSignal {
                index,
                value: value.clone(),
            })
        })
        .collect()
}
