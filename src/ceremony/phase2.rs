use ark_std::{end_timer, start_timer};
use halo2_proofs::{
    arithmetic::FftGroup,
    halo2curves::{
        bn256::{Fr as Fp, G1Affine, G2Affine, G1, G2},
        ff::Field,
        group::{prime::PrimeCurveAffine, Curve, Group},
    },
};
use itertools::Itertools;
use rand::RngCore;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::phase1::PreparedPhase1;
use super::transcript::{
    merge_pairs, same_ratio, sample_secret, PublicKey, TranscriptHasher, PHASE2_DOMAIN,
};
use crate::errors::SetupError;
use crate::groth16::domain::Radix2Domain;
use crate::groth16::keys::{ProvingKey, VerifyingKey, CURVE, PROTOCOL};
use crate::r1cs::R1cs;
use crate::utils::encoding::{hex_digest, hex_point, hex_points};
use crate::utils::secret::SecretScalar;

const PHASE: &str = "phase 2";

/// The public trace of one phase-2 contribution: who, the key of its secret `δ'` and `[δ]_1` after it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Phase2Contribution {
    pub name: String,
    pub delta_key: PublicKey,
    #[serde(with = "hex_point")]
    pub delta_g1: G1Affine,
    #[serde(with = "hex_digest")]
    pub digest: [u8; 32],
}

impl Phase2Contribution {
    fn compute_digest(&self, previous: &[u8; 32]) -> [u8; 32] {
        let mut hasher = TranscriptHasher::chain(previous);
        hasher.absorb_bytes(self.name.as_bytes());
        self.delta_key.absorb_into(&mut hasher);
        hasher.absorb_point(&self.delta_g1);
        hasher.finalize()
    }
}

/// Circuit specific state of the ceremony: a proving key whose `δ` is still being randomised.
///
/// Only `delta_g1`, `delta_g2`, `l_query` and `h_query` change between contributions; everything
/// else is a deterministic function of the circuit and the phase-1 accumulator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Phase2 {
    #[serde(with = "hex_digest")]
    circuit_digest: [u8; 32],
    #[serde(with = "hex_digest")]
    phase1_digest: [u8; 32],
    domain_log_size: u32,
    num_public: usize,
    num_variables: usize,
    #[serde(with = "hex_point")]
    alpha_g1: G1Affine,
    #[serde(with = "hex_point")]
    beta_g1: G1Affine,
    #[serde(with = "hex_point")]
    beta_g2: G2Affine,
    #[serde(with = "hex_point")]
    delta_g1: G1Affine,
    #[serde(with = "hex_point")]
    delta_g2: G2Affine,
    #[serde(with = "hex_points")]
    a_query: Vec<G1Affine>,
    #[serde(with = "hex_points")]
    b_g1_query: Vec<G1Affine>,
    #[serde(with = "hex_points")]
    b_g2_query: Vec<G2Affine>,
    #[serde(with = "hex_points")]
    h_query: Vec<G1Affine>,
    #[serde(with = "hex_points")]
    l_query: Vec<G1Affine>,
    #[serde(with = "hex_points")]
    ic: Vec<G1Affine>,
    contributions: Vec<Phase2Contribution>,
}

impl Phase2 {
    /// Specialises a verified phase-1 accumulator to `r1cs`, with `δ = 1`.
    ///
    /// Each input wire `j` (the constant included) gets an extra row `z_j · 0 = 0` so that the
    /// public input polynomials are linearly independent.
    pub fn initialize(r1cs: &R1cs, prepared: &PreparedPhase1) -> Result<Self, SetupError> {
        let timer = start_timer!(|| "Initializing phase 2");
        let num_inputs = 1 + r1cs.num_public();
        let num_constraints = r1cs.constraints().len();
        let rows = num_constraints + num_inputs;

        let domain = Radix2Domain::for_rows(rows).ok_or(SetupError::CircuitTooLarge {
            needed: usize::BITS - rows.leading_zeros(),
            available: prepared.power(),
        })?;
        if domain.log_size() > prepared.power() {
            return Err(SetupError::CircuitTooLarge {
                needed: domain.log_size(),
                available: prepared.power(),
            });
        }
        let n = domain.size();

        // [L_i(τ)] from [τ^i] with an inverse FFT over the group
        let lagrange_g1 = lagrange_basis(&domain, &prepared.tau_g1()[..n]);
        let lagrange_g2 = lagrange_basis(&domain, &prepared.tau_g2()[..n]);
        let alpha_lagrange_g1 = lagrange_basis(&domain, &prepared.alpha_tau_g1()[..n]);
        let beta_lagrange_g1 = lagrange_basis(&domain, &prepared.beta_tau_g1()[..n]);

        // Column view of the matrices: for every wire, the rows it appears in
        let num_variables = r1cs.num_variables();
        let mut a_columns: Vec<Vec<(usize, Fp)>> = vec![vec![]; num_variables];
        let mut b_columns: Vec<Vec<(usize, Fp)>> = vec![vec![]; num_variables];
        let mut c_columns: Vec<Vec<(usize, Fp)>> = vec![vec![]; num_variables];
        for (row, constraint) in r1cs.constraints().iter().enumerate() {
            for (columns, terms) in [
                (&mut a_columns, &constraint.a),
                (&mut b_columns, &constraint.b),
                (&mut c_columns, &constraint.c),
            ] {
                for (variable, coeff) in terms {
                    columns[*variable].push((row, *coeff));
                }
            }
        }
        for (input, column) in a_columns.iter_mut().take(num_inputs).enumerate() {
            column.push((num_constraints + input, Fp::ONE));
        }

        let queries: Vec<(G1, G1, G2, G1)> = (0..num_variables)
            .into_par_iter()
            .map(|j| {
                let a = evaluate_column(&a_columns[j], &lagrange_g1);
                let b_g1 = evaluate_column(&b_columns[j], &lagrange_g1);
                let b_g2 = evaluate_column(&b_columns[j], &lagrange_g2);
                // K_j = β·A_j(τ) + α·B_j(τ) + C_j(τ)
                let k = evaluate_column(&a_columns[j], &beta_lagrange_g1)
                    + evaluate_column(&b_columns[j], &alpha_lagrange_g1)
                    + evaluate_column(&c_columns[j], &lagrange_g1);
                (a, b_g1, b_g2, k)
            })
            .collect();

        let (a_query, b_g1_query, b_g2_query, k_query): (Vec<G1>, Vec<G1>, Vec<G2>, Vec<G1>) =
            queries.into_iter().multiunzip();
        let a_query: Vec<G1Affine> = normalize(&a_query);
        let b_g1_query: Vec<G1Affine> = normalize(&b_g1_query);
        let b_g2_query: Vec<G2Affine> = normalize(&b_g2_query);
        let k_query: Vec<G1Affine> = normalize(&k_query);

        // τ^i · Z(τ) = τ^(i+n) - τ^i
        let tau_g1 = prepared.tau_g1();
        let h_query: Vec<G1Affine> = normalize(
            &(0..n - 1)
                .into_par_iter()
                .map(|i| tau_g1[i + n].to_curve() - tau_g1[i])
                .collect::<Vec<_>>(),
        );

        end_timer!(timer);
        Ok(Phase2 {
            circuit_digest: r1cs.digest(),
            phase1_digest: prepared.digest(),
            domain_log_size: domain.log_size(),
            num_public: r1cs.num_public(),
            num_variables,
            alpha_g1: prepared.alpha_tau_g1()[0],
            beta_g1: prepared.beta_tau_g1()[0],
            beta_g2: prepared.beta_g2(),
            delta_g1: G1Affine::generator(),
            delta_g2: G2Affine::generator(),
            a_query,
            b_g1_query,
            b_g2_query,
            h_query,
            l_query: k_query[num_inputs..].to_vec(),
            ic: k_query[..num_inputs].to_vec(),
            contributions: vec![],
        })
    }

    pub fn contributions(&self) -> &[Phase2Contribution] {
        &self.contributions
    }

    pub fn circuit_digest(&self) -> [u8; 32] {
        self.circuit_digest
    }

    pub fn digest(&self) -> [u8; 32] {
        self.contributions
            .last()
            .map(|contribution| contribution.digest)
            .unwrap_or_else(|| initial_digest(&self.circuit_digest, &self.phase1_digest))
    }

    /// Multiplies `δ` by a fresh secret and divides the queries that depend on it.
    /// The secret and its inverse are wiped before this returns.
    pub fn contribute<R: RngCore>(mut self, name: &str, mut rng: R) -> Result<Self, SetupError> {
        let index = self.contributions.len();
        if name.trim().is_empty() {
            return Err(SetupError::InvalidContribution {
                index,
                name: name.to_owned(),
                reason: "contributor name must not be empty".to_owned(),
            });
        }

        let timer = start_timer!(|| format!("Phase 2 contribution of {}", name));
        let delta = sample_secret(&mut rng);
        let delta_inv = Zeroizing::new(SecretScalar(
            Option::from(delta.0.invert()).ok_or_else(|| SetupError::InvalidContribution {
                index,
                name: name.to_owned(),
                reason: "secret is not invertible".to_owned(),
            })?,
        ));

        let previous = self.digest();
        let delta_key = PublicKey::new(&delta, &previous, &mut rng);

        self.delta_g1 = (self.delta_g1 * delta.0).to_affine();
        self.delta_g2 = (self.delta_g2 * delta.0).to_affine();
        rescale(&mut self.l_query, &delta_inv);
        rescale(&mut self.h_query, &delta_inv);

        let mut contribution = Phase2Contribution {
            name: name.to_owned(),
            delta_key,
            delta_g1: self.delta_g1,
            digest: [0u8; 32],
        };
        contribution.digest = contribution.compute_digest(&previous);
        log::info!(
            "phase 2 contribution #{} by {}: {}",
            index,
            name,
            hex::encode(contribution.digest)
        );
        self.contributions.push(contribution);
        end_timer!(timer);

        Ok(self)
    }

    /// Recomputes the initial state from `r1cs` and `prepared` and checks that this state only
    /// differs from it by the `δ` updates recorded in the transcript.
    pub fn verify(&self, r1cs: &R1cs, prepared: &PreparedPhase1) -> Result<(), SetupError> {
        let circuit_digest = r1cs.digest();
        if self.circuit_digest != circuit_digest {
            return Err(SetupError::CircuitMismatch {
                state: hex::encode(self.circuit_digest),
                circuit: hex::encode(circuit_digest),
            });
        }
        if self.phase1_digest != prepared.digest() {
            return Err(SetupError::Phase1Mismatch);
        }

        let timer = start_timer!(|| "Verifying phase 2 transcript");
        let initial = Phase2::initialize(r1cs, prepared)?;
        if self.domain_log_size != initial.domain_log_size
            || self.num_public != initial.num_public
            || self.num_variables != initial.num_variables
            || self.alpha_g1 != initial.alpha_g1
            || self.beta_g1 != initial.beta_g1
            || self.beta_g2 != initial.beta_g2
            || self.a_query != initial.a_query
            || self.b_g1_query != initial.b_g1_query
            || self.b_g2_query != initial.b_g2_query
            || self.ic != initial.ic
        {
            return Err(self.invalid_state("circuit queries differ from the initial state"));
        }
        if self.l_query.len() != initial.l_query.len() || self.h_query.len() != initial.h_query.len()
        {
            return Err(self.invalid_state("delta dependent queries have the wrong length"));
        }

        let g1 = G1Affine::generator();
        let g2 = G2Affine::generator();

        let mut digest = initial.digest();
        let mut before = g1;
        for (index, contribution) in self.contributions.iter().enumerate() {
            if contribution.compute_digest(&digest) != contribution.digest {
                return Err(SetupError::BrokenTranscript {
                    phase: PHASE,
                    index,
                });
            }
            if let Some(previous) = self.contributions[..index]
                .iter()
                .position(|earlier| earlier.delta_key.g1 == contribution.delta_key.g1)
            {
                return Err(SetupError::ReusedRandomness {
                    index,
                    name: contribution.name.clone(),
                    previous,
                });
            }
            if !contribution.delta_key.verify(&digest) {
                return Err(invalid(
                    index,
                    &contribution.name,
                    "delta key fails its proof of knowledge",
                ));
            }
            if !same_ratio(
                (before, contribution.delta_g1),
                (g2, contribution.delta_key.g2),
            ) {
                return Err(invalid(
                    index,
                    &contribution.name,
                    "delta update does not match its key",
                ));
            }
            digest = contribution.digest;
            before = contribution.delta_g1;
        }

        if self.delta_g1 != before {
            return Err(self.invalid_state("delta does not match the last contribution"));
        }
        if !same_ratio((g1, self.delta_g1), (g2, self.delta_g2)) {
            return Err(self.invalid_state("[δ]_1 and [δ]_2 disagree"));
        }

        // queries[i] · δ = initial[i] for every i
        for (label, current, initial) in [
            ("l_query", &self.l_query, &initial.l_query),
            ("h_query", &self.h_query, &initial.h_query),
        ] {
            let (current, initial) = merge_pairs(current, initial);
            if !same_ratio((current, initial), (g2, self.delta_g2)) {
                return Err(self.invalid_state(&format!("{} is not divided by δ", label)));
            }
        }

        end_timer!(timer);
        Ok(())
    }

    /// Verifies the whole ceremony for `r1cs` and exports the key pair
    pub fn finalize(
        self,
        r1cs: &R1cs,
        prepared: &PreparedPhase1,
    ) -> Result<(ProvingKey, VerifyingKey), SetupError> {
        if self.contributions.is_empty() {
            return Err(SetupError::MissingPhase2Contribution);
        }
        self.verify(r1cs, prepared)?;

        let vk = VerifyingKey {
            protocol: PROTOCOL.to_owned(),
            curve: CURVE.to_owned(),
            n_public: self.num_public,
            circuit_digest: self.circuit_digest,
            alpha_g1: self.alpha_g1,
            beta_g2: self.beta_g2,
            gamma_g2: G2Affine::generator(),
            delta_g2: self.delta_g2,
            ic: self.ic,
        };
        let pk = ProvingKey {
            circuit_digest: self.circuit_digest,
            domain_log_size: self.domain_log_size,
            num_public: self.num_public,
            num_variables: self.num_variables,
            alpha_g1: self.alpha_g1,
            beta_g1: self.beta_g1,
            beta_g2: self.beta_g2,
            delta_g1: self.delta_g1,
            delta_g2: self.delta_g2,
            a_query: self.a_query,
            b_g1_query: self.b_g1_query,
            b_g2_query: self.b_g2_query,
            h_query: self.h_query,
            l_query: self.l_query,
            vk: vk.clone(),
        };
        Ok((pk, vk))
    }

    fn invalid_state(&self, reason: &str) -> SetupError {
        let index = self.contributions.len().saturating_sub(1);
        let name = self
            .contributions
            .last()
            .map(|contribution| contribution.name.clone())
            .unwrap_or_else(|| "initial state".to_owned());
        invalid(index, &name, reason)
    }
}

fn initial_digest(circuit_digest: &[u8; 32], phase1_digest: &[u8; 32]) -> [u8; 32] {
    let mut hasher = TranscriptHasher::new(PHASE2_DOMAIN);
    hasher.absorb_bytes(circuit_digest).absorb_bytes(phase1_digest);
    hasher.finalize()
}

fn invalid(index: usize, name: &str, reason: &str) -> SetupError {
    SetupError::InvalidContribution {
        index,
        name: name.to_owned(),
        reason: reason.to_owned(),
    }
}

fn lagrange_basis<C>(domain: &Radix2Domain, powers: &[C]) -> Vec<C>
where
    C: PrimeCurveAffine<Scalar = Fp> + Send + Sync,
    C::Curve: FftGroup<Fp>,
{
    let mut projective: Vec<C::Curve> = powers.par_iter().map(|point| point.to_curve()).collect();
    domain.ifft(&mut projective);
    normalize(&projective)
}

fn normalize<C: PrimeCurveAffine>(points: &[C::Curve]) -> Vec<C> {
    let mut affine = vec![C::identity(); points.len()];
    C::Curve::batch_normalize(points, &mut affine);
    affine
}

fn evaluate_column<C>(column: &[(usize, Fp)], bases: &[C]) -> C::Curve
where
    C: PrimeCurveAffine<Scalar = Fp>,
{
    column
        .iter()
        .fold(C::Curve::identity(), |acc, (row, coeff)| acc + bases[*row] * *coeff)
}

fn rescale(points: &mut [G1Affine], factor: &SecretScalar) {
    let factor = factor.0;
    let projective: Vec<G1> = points.par_iter().map(|point| *point * factor).collect();
    G1::batch_normalize(&projective, points);
}
