use ark_std::{end_timer, start_timer};
use halo2_proofs::{
    arithmetic::{best_multiexp, parallelize},
    halo2curves::{
        bn256::{Fr as Fp, G1Affine, G1, G2},
        ff::Field,
        group::{prime::PrimeCurveAffine, Curve},
    },
};
use rand::RngCore;
use rayon::prelude::*;
use zeroize::Zeroizing;

use super::domain::Radix2Domain;
use super::keys::ProvingKey;
use super::proof::Proof;
use crate::errors::ProverError;
use crate::r1cs::{R1cs, Witness};
use crate::utils::secret::SecretScalar;

/// Creates a Groth16 proof that `witness` satisfies `r1cs`.
///
/// The key must come from a ceremony over the same constraint system and the witness must
/// satisfy every constraint; anything else is an integrity error and no proof is produced.
/// `rng` supplies the blinding factors `r` and `s`: it must be fresh for every call.
pub fn create_proof<R: RngCore>(
    pk: &ProvingKey,
    r1cs: &R1cs,
    witness: &Witness,
    mut rng: R,
) -> Result<Proof, ProverError> {
    let circuit_digest = r1cs.digest();
    if pk.circuit_digest != circuit_digest {
        return Err(ProverError::KeyMismatch {
            key: hex::encode(pk.circuit_digest),
            circuit: hex::encode(circuit_digest),
        });
    }
    pk.check_dimensions()
        .and_then(|_| check_circuit_shape(pk, r1cs))
        .map_err(|reason| ProverError::KeyMismatch {
            key: format!("{} ({})", hex::encode(pk.circuit_digest), reason),
            circuit: hex::encode(circuit_digest),
        })?;
    r1cs.check_witness(witness)?;

    let timer = start_timer!(|| "Creating Groth16 proof");
    let z = witness.assignment();
    let num_inputs = 1 + r1cs.num_public();

    let h_timer = start_timer!(|| "Computing h(X)");
    let h = compute_h(pk, r1cs, &z);
    end_timer!(h_timer);

    let r = Zeroizing::new(SecretScalar(Fp::random(&mut rng)));
    let s = Zeroizing::new(SecretScalar(Fp::random(&mut rng)));

    let msm_timer = start_timer!(|| "Multi-scalar multiplications");
    let ((a_msm, b_g1_msm), (b_g2_msm, (l_msm, h_msm))) = rayon::join(
        || {
            rayon::join(
                || best_multiexp(&z, &pk.a_query),
                || best_multiexp(&z, &pk.b_g1_query),
            )
        },
        || {
            rayon::join(
                || best_multiexp(&z, &pk.b_g2_query),
                || {
                    rayon::join(
                        || best_multiexp(&z[num_inputs..], &pk.l_query),
                        || best_multiexp(&h, &pk.h_query),
                    )
                },
            )
        },
    );
    end_timer!(msm_timer);

    // A = α + Σ z_j·A_j(τ) + r·δ
    let a: G1 = a_msm + pk.alpha_g1 + pk.delta_g1 * r.0;
    // B = β + Σ z_j·B_j(τ) + s·δ, in both groups
    let b_g2: G2 = b_g2_msm + pk.beta_g2 + pk.delta_g2 * s.0;
    let b_g1: G1 = b_g1_msm + pk.beta_g1 + pk.delta_g1 * s.0;
    // C = (Σ private z_j·K_j(τ) + h(τ)·Z(τ)) / δ + s·A + r·B - r·s·δ
    let rs = Zeroizing::new(SecretScalar(r.0 * s.0));
    let c: G1 = l_msm + h_msm + a * s.0 + b_g1 * r.0 - pk.delta_g1 * rs.0;

    let mut points = [G1Affine::identity(); 2];
    G1::batch_normalize(&[a, c], &mut points);
    end_timer!(timer);

    Ok(Proof {
        a: points[0],
        b: b_g2.to_affine(),
        c: points[1],
    })
}

fn check_circuit_shape(pk: &ProvingKey, r1cs: &R1cs) -> Result<(), String> {
    if pk.num_public != r1cs.num_public() || pk.num_variables != r1cs.num_variables() {
        return Err(format!(
            "key covers {} wires ({} public), circuit has {} ({} public)",
            pk.num_variables,
            pk.num_public,
            r1cs.num_variables(),
            r1cs.num_public()
        ));
    }
    let rows = r1cs.constraints().len() + 1 + r1cs.num_public();
    if rows > pk.domain_size() {
        return Err(format!(
            "{} rows do not fit the key domain of size {}",
            rows,
            pk.domain_size()
        ));
    }
    Ok(())
}

/// Coefficients of `h(X) = (A(X)·B(X) - C(X)) / Z(X)`, where `A`, `B` and `C` interpolate the
/// constraint rows evaluated at `z`, followed by one row `A = z_j` per input wire.
fn compute_h(pk: &ProvingKey, r1cs: &R1cs, z: &[Fp]) -> Vec<Fp> {
    // The key dimensions were checked against a supported domain at creation
    let domain = Radix2Domain::new(pk.domain_log_size).unwrap();
    let n = domain.size();
    let num_inputs = 1 + r1cs.num_public();
    let constraints = r1cs.constraints();

    let mut a = vec![Fp::ZERO; n];
    let mut b = vec![Fp::ZERO; n];
    let mut c = vec![Fp::ZERO; n];

    a.par_iter_mut()
        .zip(b.par_iter_mut())
        .zip(c.par_iter_mut())
        .zip(constraints.par_iter())
        .for_each(|(((a, b), c), constraint)| {
            let (a_eval, b_eval, c_eval) = constraint.evaluate(z);
            *a = a_eval;
            *b = b_eval;
            *c = c_eval;
        });
    a[constraints.len()..constraints.len() + num_inputs].copy_from_slice(&z[..num_inputs]);

    rayon::join(
        || {
            rayon::join(
                || {
                    domain.ifft(&mut a);
                    domain.coset_fft(&mut a);
                },
                || {
                    domain.ifft(&mut b);
                    domain.coset_fft(&mut b);
                },
            )
        },
        || {
            domain.ifft(&mut c);
            domain.coset_fft(&mut c);
        },
    );

    let z_inv = domain.vanishing_on_coset_inv();
    parallelize(&mut a, |chunk, start| {
        for (i, value) in chunk.iter_mut().enumerate() {
            *value = (*value * b[start + i] - c[start + i]) * z_inv;
        }
    });

    domain.coset_ifft(&mut a);
    // deg h <= n - 2
    a.truncate(n - 1);
    a
}
