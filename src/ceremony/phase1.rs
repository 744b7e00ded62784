use ark_std::{end_timer, start_timer};
use halo2_proofs::{
    arithmetic::parallelize,
    halo2curves::{
        bn256::{Fr as Fp, G1Affine, G2Affine},
        ff::{Field, PrimeField},
        group::{prime::PrimeCurveAffine, Curve},
    },
};
use rand::RngCore;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::transcript::{
    merge_pairs, same_ratio, sample_secret, PublicKey, TranscriptHasher, PHASE1_DOMAIN,
};
use crate::errors::SetupError;
use crate::utils::encoding::{hex_digest, hex_point, hex_points};
use crate::utils::secret::SecretScalar;

const PHASE: &str = "phase 1";

/// The public trace of one phase-1 contribution: who, the keys of the three secrets
/// `(τ, α, β)` and the accumulator values `[τ]_1`, `[α]_1`, `[β]_1` right after it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Phase1Contribution {
    pub name: String,
    pub tau_key: PublicKey,
    pub alpha_key: PublicKey,
    pub beta_key: PublicKey,
    #[serde(with = "hex_point")]
    pub tau_g1: G1Affine,
    #[serde(with = "hex_point")]
    pub alpha_g1: G1Affine,
    #[serde(with = "hex_point")]
    pub beta_g1: G1Affine,
    #[serde(with = "hex_digest")]
    pub digest: [u8; 32],
}

impl Phase1Contribution {
    fn compute_digest(&self, previous: &[u8; 32]) -> [u8; 32] {
        let mut hasher = TranscriptHasher::chain(previous);
        hasher.absorb_bytes(self.name.as_bytes());
        for key in [&self.tau_key, &self.alpha_key, &self.beta_key] {
            key.absorb_into(&mut hasher);
        }
        hasher
            .absorb_point(&self.tau_g1)
            .absorb_point(&self.alpha_g1)
            .absorb_point(&self.beta_g1);
        hasher.finalize()
    }

    fn keys(&self) -> [&PublicKey; 3] {
        [&self.tau_key, &self.alpha_key, &self.beta_key]
    }
}

/// Circuit independent accumulator of the powers of a secret `τ`, supporting circuits whose
/// constraint count (public inputs included) fits in `2^power`.
///
/// | vector          | content                      | length        |
/// |-----------------|------------------------------|---------------|
/// | `tau_g1`        | `[τ^i]_1`                    | `2^(p+1) - 1` |
/// | `tau_g2`        | `[τ^i]_2`                    | `2^p`         |
/// | `alpha_tau_g1`  | `[α·τ^i]_1`                  | `2^p`         |
/// | `beta_tau_g1`   | `[β·τ^i]_1`                  | `2^p`         |
/// | `beta_g2`       | `[β]_2`                      | 1             |
///
/// Every contribution consumes the accumulator and returns the next one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PowersOfTau {
    power: u32,
    #[serde(with = "hex_points")]
    tau_g1: Vec<G1Affine>,
    #[serde(with = "hex_points")]
    tau_g2: Vec<G2Affine>,
    #[serde(with = "hex_points")]
    alpha_tau_g1: Vec<G1Affine>,
    #[serde(with = "hex_points")]
    beta_tau_g1: Vec<G1Affine>,
    #[serde(with = "hex_point")]
    beta_g2: G2Affine,
    contributions: Vec<Phase1Contribution>,
}

impl PowersOfTau {
    /// The starting accumulator, `τ = α = β = 1`. It carries no trust until contributed to.
    pub fn new(power: u32) -> Result<Self, SetupError> {
        if power == 0 || power > Fp::S {
            return Err(SetupError::UnsupportedPower(power));
        }
        let n = 1usize << power;
        Ok(PowersOfTau {
            power,
            tau_g1: vec![G1Affine::generator(); 2 * n - 1],
            tau_g2: vec![G2Affine::generator(); n],
            alpha_tau_g1: vec![G1Affine::generator(); n],
            beta_tau_g1: vec![G1Affine::generator(); n],
            beta_g2: G2Affine::generator(),
            contributions: vec![],
        })
    }

    pub fn power(&self) -> u32 {
        self.power
    }

    pub fn contributions(&self) -> &[Phase1Contribution] {
        &self.contributions
    }

    /// Digest of the transcript so far
    pub fn digest(&self) -> [u8; 32] {
        self.contributions
            .last()
            .map(|contribution| contribution.digest)
            .unwrap_or_else(|| initial_digest(self.power))
    }

    /// Mixes fresh secrets drawn from `rng` into the accumulator. The secrets and their powers
    /// are wiped before this returns, whatever the outcome.
    pub fn contribute<R: RngCore>(mut self, name: &str, mut rng: R) -> Result<Self, SetupError> {
        if name.trim().is_empty() {
            return Err(SetupError::InvalidContribution {
                index: self.contributions.len(),
                name: name.to_owned(),
                reason: "contributor name must not be empty".to_owned(),
            });
        }

        let timer = start_timer!(|| format!("Phase 1 contribution of {}", name));
        let tau = sample_secret(&mut rng);
        let alpha = sample_secret(&mut rng);
        let beta = sample_secret(&mut rng);

        let previous = self.digest();
        let tau_key = PublicKey::new(&tau, &previous, &mut rng);
        let alpha_key = PublicKey::new(&alpha, &previous, &mut rng);
        let beta_key = PublicKey::new(&beta, &previous, &mut rng);

        let powers = powers_of(&tau, self.tau_g1.len());
        let n = self.tau_g2.len();

        scale(&mut self.tau_g1, &powers, None);
        scale(&mut self.tau_g2, &powers[..n], None);
        scale(&mut self.alpha_tau_g1, &powers[..n], Some(&alpha));
        scale(&mut self.beta_tau_g1, &powers[..n], Some(&beta));
        self.beta_g2 = (self.beta_g2 * beta.0).to_affine();

        let mut contribution = Phase1Contribution {
            name: name.to_owned(),
            tau_key,
            alpha_key,
            beta_key,
            tau_g1: self.tau_g1[1],
            alpha_g1: self.alpha_tau_g1[0],
            beta_g1: self.beta_tau_g1[0],
            digest: [0u8; 32],
        };
        contribution.digest = contribution.compute_digest(&previous);
        log::info!(
            "phase 1 contribution #{} by {}: {}",
            self.contributions.len(),
            name,
            hex::encode(contribution.digest)
        );
        self.contributions.push(contribution);
        end_timer!(timer);

        Ok(self)
    }

    /// Replays the transcript and checks the accumulator against it: every contribution builds on
    /// the previous digest, proves knowledge of its secrets, never reuses them and moves the
    /// accumulator by exactly its secrets; the vectors are consistent powers of one `τ`.
    pub fn verify(&self) -> Result<(), SetupError> {
        let timer = start_timer!(|| "Verifying phase 1 transcript");
        let n = 1usize << self.power;
        if self.tau_g1.len() != 2 * n - 1
            || self.tau_g2.len() != n
            || self.alpha_tau_g1.len() != n
            || self.beta_tau_g1.len() != n
        {
            return Err(self.invalid_accumulator("vector lengths do not match the power"));
        }

        let g1 = G1Affine::generator();
        let g2 = G2Affine::generator();

        let mut digest = initial_digest(self.power);
        let mut before = [g1, g1, g1];
        for (index, contribution) in self.contributions.iter().enumerate() {
            if contribution.compute_digest(&digest) != contribution.digest {
                return Err(SetupError::BrokenTranscript {
                    phase: PHASE,
                    index,
                });
            }

            if let Some(previous) = self.contributions[..index].iter().position(|earlier| {
                earlier
                    .keys()
                    .iter()
                    .zip(contribution.keys().iter())
                    .any(|(old, new)| old.g1 == new.g1)
            }) {
                return Err(SetupError::ReusedRandomness {
                    index,
                    name: contribution.name.clone(),
                    previous,
                });
            }

            let after = [
                contribution.tau_g1,
                contribution.alpha_g1,
                contribution.beta_g1,
            ];
            for ((label, key), (before, after)) in ["tau", "alpha", "beta"]
                .iter()
                .zip(contribution.keys())
                .zip(before.iter().zip(after.iter()))
            {
                if !key.verify(&digest) {
                    return Err(invalid(
                        index,
                        &contribution.name,
                        format!("{} key fails its proof of knowledge", label),
                    ));
                }
                if !same_ratio((*before, *after), (g2, key.g2)) {
                    return Err(invalid(
                        index,
                        &contribution.name,
                        format!("{} update does not match its key", label),
                    ));
                }
            }

            digest = contribution.digest;
            before = after;
        }

        if self.tau_g1[1] != before[0]
            || self.alpha_tau_g1[0] != before[1]
            || self.beta_tau_g1[0] != before[2]
        {
            return Err(self.invalid_accumulator("accumulator does not match the last contribution"));
        }
        if self.tau_g1[0] != g1 || self.tau_g2[0] != g2 {
            return Err(self.invalid_accumulator("powers must start at the generators"));
        }

        let tau_g2 = self.tau_g2[1];
        if !same_ratio((g1, self.tau_g1[1]), (g2, tau_g2)) {
            return Err(self.invalid_accumulator("[τ]_1 and [τ]_2 disagree"));
        }
        for (label, powers) in [
            ("tau_g1", &self.tau_g1),
            ("alpha_tau_g1", &self.alpha_tau_g1),
            ("beta_tau_g1", &self.beta_tau_g1),
        ] {
            let (lhs, rhs) = merge_pairs(&powers[..powers.len() - 1], &powers[1..]);
            if !same_ratio((lhs, rhs), (g2, tau_g2)) {
                return Err(
                    self.invalid_accumulator(&format!("{} are not successive powers of τ", label))
                );
            }
        }
        let (lhs, rhs) = merge_pairs(&self.tau_g2[..n - 1], &self.tau_g2[1..]);
        if !same_ratio((g1, self.tau_g1[1]), (lhs, rhs)) {
            return Err(self.invalid_accumulator("tau_g2 are not successive powers of τ"));
        }
        if !same_ratio((g1, self.beta_tau_g1[0]), (g2, self.beta_g2)) {
            return Err(self.invalid_accumulator("[β]_1 and [β]_2 disagree"));
        }

        end_timer!(timer);
        Ok(())
    }

    /// Closes phase 1. Only a verified accumulator with at least one contribution can be specialised.
    pub fn prepare_phase2(self) -> Result<PreparedPhase1, SetupError> {
        if self.contributions.is_empty() {
            return Err(SetupError::MissingPhase1Contribution("preparing phase 2"));
        }
        self.verify()?;

        Ok(PreparedPhase1 {
            power: self.power,
            digest: self.digest(),
            tau_g1: self.tau_g1,
            tau_g2: self.tau_g2,
            alpha_tau_g1: self.alpha_tau_g1,
            beta_tau_g1: self.beta_tau_g1,
            beta_g2: self.beta_g2,
        })
    }

    fn invalid_accumulator(&self, reason: &str) -> SetupError {
        let index = self.contributions.len().saturating_sub(1);
        let name = self
            .contributions
            .last()
            .map(|contribution| contribution.name.clone())
            .unwrap_or_else(|| "initial accumulator".to_owned());
        invalid(index, &name, reason.to_owned())
    }
}

/// A verified phase-1 accumulator. Phase 2 can only start from one of these.
#[derive(Clone, Debug)]
pub struct PreparedPhase1 {
    power: u32,
    digest: [u8; 32],
    tau_g1: Vec<G1Affine>,
    tau_g2: Vec<G2Affine>,
    alpha_tau_g1: Vec<G1Affine>,
    beta_tau_g1: Vec<G1Affine>,
    beta_g2: G2Affine,
}

impl PreparedPhase1 {
    pub fn power(&self) -> u32 {
        self.power
    }

    pub fn digest(&self) -> [u8; 32] {
        self.digest
    }

    pub(crate) fn tau_g1(&self) -> &[G1Affine] {
        &self.tau_g1
    }

    pub(crate) fn tau_g2(&self) -> &[G2Affine] {
        &self.tau_g2
    }

    pub(crate) fn alpha_tau_g1(&self) -> &[G1Affine] {
        &self.alpha_tau_g1
    }

    pub(crate) fn beta_tau_g1(&self) -> &[G1Affine] {
        &self.beta_tau_g1
    }

    pub(crate) fn beta_g2(&self) -> G2Affine {
        self.beta_g2
    }
}

pub(crate) fn initial_digest(power: u32) -> [u8; 32] {
    let mut hasher = TranscriptHasher::new(PHASE1_DOMAIN);
    hasher.absorb_u64(power as u64);
    hasher.finalize()
}

fn invalid(index: usize, name: &str, reason: String) -> SetupError {
    SetupError::InvalidContribution {
        index,
        name: name.to_owned(),
        reason,
    }
}

/// `[1, x, x^2, ..]`, wiped on drop
fn powers_of(x: &SecretScalar, len: usize) -> Zeroizing<Vec<SecretScalar>> {
    let mut powers = Zeroizing::new(vec![SecretScalar::default(); len]);
    let x = x.0;
    parallelize(powers.as_mut_slice(), move |chunk, start| {
        let mut cur = x.pow_vartime([start as u64]);
        for power in chunk.iter_mut() {
            *power = SecretScalar(cur);
            cur *= x;
        }
    });
    powers
}

/// `points[i] *= factor · powers[i]`
fn scale<C>(points: &mut [C], powers: &[SecretScalar], factor: Option<&SecretScalar>)
where
    C: PrimeCurveAffine<Scalar = Fp> + Send + Sync,
    C::Curve: Send,
{
    let factor = factor.map_or(Fp::ONE, |factor| factor.0);
    let projective: Vec<C::Curve> = points
        .par_iter()
        .zip(powers.par_iter())
        .map(|(point, power)| *point * (power.0 * factor))
        .collect();
    C::Curve::batch_normalize(&projective, points);
}
