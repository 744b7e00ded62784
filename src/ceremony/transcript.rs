use halo2_proofs::{
    arithmetic::{best_multiexp, CurveAffine},
    halo2curves::{
        bn256::{Bn256, Fr as Fp, G1Affine, G2Affine},
        ff::{Field, PrimeField},
        group::{prime::PrimeCurveAffine, Curve, GroupEncoding},
        pairing::Engine,
    },
};
use num_bigint::BigUint;
use rand::{rngs::OsRng, CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::utils::big_uint_to_fp;
use crate::utils::encoding::{decimal_fp, hex_point};
use crate::utils::secret::SecretScalar;

pub(crate) const PHASE1_DOMAIN: &[u8] = b"reserves-ptau-v1";
pub(crate) const PHASE2_DOMAIN: &[u8] = b"reserves-phase2-v1";
const POK_DOMAIN: &[u8] = b"reserves-pok-v1";

/// Keccak sponge over length-prefixed items. Every ceremony digest is chained from the previous one.
pub(crate) struct TranscriptHasher(Keccak256);

impl TranscriptHasher {
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = TranscriptHasher(Keccak256::new());
        hasher.absorb_bytes(domain);
        hasher
    }

    pub fn chain(previous: &[u8; 32]) -> Self {
        let mut hasher = TranscriptHasher(Keccak256::new());
        hasher.absorb_bytes(previous);
        hasher
    }

    pub fn absorb_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.0.update((bytes.len() as u64).to_le_bytes());
        self.0.update(bytes);
        self
    }

    pub fn absorb_point<C: GroupEncoding>(&mut self, point: &C) -> &mut Self {
        self.absorb_bytes(point.to_bytes().as_ref())
    }

    pub fn absorb_u64(&mut self, value: u64) -> &mut Self {
        self.0.update(value.to_le_bytes());
        self
    }

    pub fn finalize(self) -> [u8; 32] {
        self.0.finalize().into()
    }
}

/// Public trace of one secret `x`: `[x]_1`, `[x]_2` and a Schnorr proof of knowledge of `x`
/// bound to the transcript digest the contribution builds on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PublicKey {
    #[serde(with = "hex_point")]
    pub g1: G1Affine,
    #[serde(with = "hex_point")]
    pub g2: G2Affine,
    #[serde(with = "hex_point")]
    pub pok_commitment: G1Affine,
    #[serde(with = "decimal_fp")]
    pub pok_response: Fp,
}

impl PublicKey {
    pub(crate) fn new<R: RngCore>(secret: &SecretScalar, transcript: &[u8; 32], rng: &mut R) -> Self {
        let g1 = (G1Affine::generator() * secret.0).to_affine();
        let g2 = (G2Affine::generator() * secret.0).to_affine();

        let nonce = sample_secret(rng);
        let pok_commitment = (G1Affine::generator() * nonce.0).to_affine();
        let challenge = pok_challenge(transcript, &g1, &pok_commitment);

        PublicKey {
            g1,
            g2,
            pok_commitment,
            pok_response: nonce.0 + challenge * secret.0,
        }
    }

    /// The same secret sits behind both group elements and the contributor knows it
    pub fn verify(&self, transcript: &[u8; 32]) -> bool {
        if bool::from(self.g1.is_identity()) || bool::from(self.g2.is_identity()) {
            return false;
        }
        if !same_ratio(
            (G1Affine::generator(), self.g1),
            (G2Affine::generator(), self.g2),
        ) {
            return false;
        }

        let challenge = pok_challenge(transcript, &self.g1, &self.pok_commitment);
        let lhs = G1Affine::generator() * self.pok_response;
        let rhs = self.g1 * challenge + self.pok_commitment;
        lhs.to_affine() == rhs.to_affine()
    }

    pub(crate) fn absorb_into(&self, hasher: &mut TranscriptHasher) {
        hasher
            .absorb_point(&self.g1)
            .absorb_point(&self.g2)
            .absorb_point(&self.pok_commitment)
            .absorb_bytes(self.pok_response.to_repr().as_ref());
    }
}

fn pok_challenge(transcript: &[u8; 32], key: &G1Affine, commitment: &G1Affine) -> Fp {
    let mut hasher = TranscriptHasher::new(POK_DOMAIN);
    hasher
        .absorb_bytes(transcript)
        .absorb_point(key)
        .absorb_point(commitment);
    big_uint_to_fp(&BigUint::from_bytes_le(&hasher.finalize()))
}

/// `g1.1 / g1.0 == g2.1 / g2.0`, checked as `e(g1.0, g2.1) == e(g1.1, g2.0)`
pub(crate) fn same_ratio(g1: (G1Affine, G1Affine), g2: (G2Affine, G2Affine)) -> bool {
    Bn256::pairing(&g1.0, &g2.1) == Bn256::pairing(&g1.1, &g2.0)
}

/// Folds two equally long vectors with the same random coefficients, so that
/// `same_ratio` on the results checks every pair `(v1[i], v2[i])` at once
pub(crate) fn merge_pairs<C: CurveAffine>(v1: &[C], v2: &[C]) -> (C, C) {
    let coeffs: Vec<C::Scalar> = (0..v1.len())
        .map(|_| C::Scalar::random(OsRng))
        .collect();
    let (lhs, rhs) = rayon::join(
        || best_multiexp(&coeffs, v1),
        || best_multiexp(&coeffs, v2),
    );
    (C::from(lhs), C::from(rhs))
}

/// Toxic waste of a contribution. Zero and one are rejected since they would leave the
/// accumulator unchanged or collapse it.
pub(crate) fn sample_secret<R: RngCore>(rng: &mut R) -> Zeroizing<SecretScalar> {
    loop {
        let candidate = Zeroizing::new(SecretScalar(Fp::random(&mut *rng)));
        if candidate.0 != Fp::ZERO && candidate.0 != Fp::ONE {
            return candidate;
        }
    }
}

/// Randomness for one contributor: the supplied entropy string hashed together with OS randomness
pub fn contributor_rng(entropy: &str) -> ContributorRng {
    let mut os_entropy = Zeroizing::new([0u8; 32]);
    OsRng.fill_bytes(os_entropy.as_mut());

    let mut hasher = Keccak256::new();
    hasher.update(entropy.as_bytes());
    hasher.update(os_entropy.as_ref());

    let mut rng = ContributorRng {
        seed: [0u8; 32],
        counter: 0,
        block: [0u8; 32],
        used: BLOCK_SIZE,
    };
    rng.seed.copy_from_slice(&hasher.finalize());
    rng
}

const BLOCK_SIZE: usize = 32;

/// Keccak in counter mode over a secret seed. The seed and the buffered output are wiped on
/// drop, so the secrets of a contribution cannot be regenerated once it is done.
pub struct ContributorRng {
    seed: [u8; 32],
    counter: u64,
    block: [u8; BLOCK_SIZE],
    used: usize,
}

impl ContributorRng {
    fn refill(&mut self) {
        let mut hasher = Keccak256::new();
        hasher.update(self.seed);
        hasher.update(self.counter.to_le_bytes());
        self.block.copy_from_slice(&hasher.finalize());
        self.counter += 1;
        self.used = 0;
    }
}

impl RngCore for ContributorRng {
    fn next_u32(&mut self) -> u32 {
        let mut bytes = [0u8; 4];
        self.fill_bytes(&mut bytes);
        u32::from_le_bytes(bytes)
    }

    fn next_u64(&mut self) -> u64 {
        let mut bytes = [0u8; 8];
        self.fill_bytes(&mut bytes);
        u64::from_le_bytes(bytes)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for byte in dest.iter_mut() {
            if self.used == BLOCK_SIZE {
                self.refill();
            }
            *byte = self.block[self.used];
            self.used += 1;
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl CryptoRng for ContributorRng {}

impl Zeroize for ContributorRng {
    fn zeroize(&mut self) {
        self.seed.zeroize();
        self.block.zeroize();
        self.counter.zeroize();
        self.used = BLOCK_SIZE;
    }
}

impl Drop for ContributorRng {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ZeroizeOnDrop for ContributorRng {}
