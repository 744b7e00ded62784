use halo2_proofs::halo2curves::{
    bn256::{Fr as Fp, G1Affine, G2Affine},
    ff::PrimeField,
};
use serde::{Deserialize, Serialize};

use crate::errors::VerifierError;
use crate::utils::encoding::{hex_digest, hex_point, hex_points};

/// Everything the prover needs, specialised to one circuit by the ceremony.
///
/// Query vectors are indexed by the position of the wire in `z = [1, public.., private..]`,
/// except `l_query` which only covers the private wires and `h_query` which holds
/// `τ^i · Z(τ) / δ` for `i < n - 1`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProvingKey {
    #[serde(with = "hex_digest")]
    pub(crate) circuit_digest: [u8; 32],
    pub(crate) domain_log_size: u32,
    pub(crate) num_public: usize,
    pub(crate) num_variables: usize,
    #[serde(with = "hex_point")]
    pub(crate) alpha_g1: G1Affine,
    #[serde(with = "hex_point")]
    pub(crate) beta_g1: G1Affine,
    #[serde(with = "hex_point")]
    pub(crate) beta_g2: G2Affine,
    #[serde(with = "hex_point")]
    pub(crate) delta_g1: G1Affine,
    #[serde(with = "hex_point")]
    pub(crate) delta_g2: G2Affine,
    #[serde(with = "hex_points")]
    pub(crate) a_query: Vec<G1Affine>,
    #[serde(with = "hex_points")]
    pub(crate) b_g1_query: Vec<G1Affine>,
    #[serde(with = "hex_points")]
    pub(crate) b_g2_query: Vec<G2Affine>,
    #[serde(with = "hex_points")]
    pub(crate) h_query: Vec<G1Affine>,
    #[serde(with = "hex_points")]
    pub(crate) l_query: Vec<G1Affine>,
    pub(crate) vk: VerifyingKey,
}

impl ProvingKey {
    pub fn get_vk(&self) -> &VerifyingKey {
        &self.vk
    }

    pub fn circuit_digest(&self) -> &[u8; 32] {
        &self.circuit_digest
    }

    pub fn domain_size(&self) -> usize {
        1 << self.domain_log_size
    }

    /// Returns a description of the first inconsistency between the key's vectors and its
    /// declared dimensions
    pub(crate) fn check_dimensions(&self) -> Result<(), String> {
        if self.domain_log_size == 0 || self.domain_log_size > Fp::S {
            return Err(format!("unsupported domain size 2^{}", self.domain_log_size));
        }
        let n = self.domain_size();
        let num_private = self.num_variables.saturating_sub(1 + self.num_public);
        let expected = [
            ("a_query", self.a_query.len(), self.num_variables),
            ("b_g1_query", self.b_g1_query.len(), self.num_variables),
            ("b_g2_query", self.b_g2_query.len(), self.num_variables),
            ("h_query", self.h_query.len(), n - 1),
            ("l_query", self.l_query.len(), num_private),
            ("vk.ic", self.vk.ic.len(), 1 + self.num_public),
        ];
        for (name, actual, expected) in expected {
            if actual != expected {
                return Err(format!(
                    "{} holds {} elements, expected {}",
                    name, actual, expected
                ));
            }
        }
        if self.vk.circuit_digest != self.circuit_digest {
            return Err("verification key belongs to another circuit".to_owned());
        }
        Ok(())
    }
}

/// Public half of the key pair. Safe to publish.
///
/// `gamma_g2` is the G2 generator; the ceremony only randomises `delta`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyingKey {
    pub protocol: String,
    pub curve: String,
    pub n_public: usize,
    #[serde(with = "hex_digest")]
    pub circuit_digest: [u8; 32],
    #[serde(with = "hex_point")]
    pub alpha_g1: G1Affine,
    #[serde(with = "hex_point")]
    pub beta_g2: G2Affine,
    #[serde(with = "hex_point")]
    pub gamma_g2: G2Affine,
    #[serde(with = "hex_point")]
    pub delta_g2: G2Affine,
    /// `[β·A_j(τ) + α·B_j(τ) + C_j(τ)]_1` for the constant wire and every public wire
    #[serde(with = "hex_points")]
    pub ic: Vec<G1Affine>,
}

pub const PROTOCOL: &str = "groth16";
pub const CURVE: &str = "bn254";

impl VerifyingKey {
    pub fn circuit_digest_hex(&self) -> String {
        hex::encode(self.circuit_digest)
    }

    /// Checks the metadata and the shape of the key. Point validity is checked on decoding.
    pub fn validate(&self) -> Result<(), VerifierError> {
        if self.protocol != PROTOCOL {
            return Err(VerifierError::MalformedKey(format!(
                "unsupported protocol {}",
                self.protocol
            )));
        }
        if self.curve != CURVE {
            return Err(VerifierError::MalformedKey(format!(
                "unsupported curve {}",
                self.curve
            )));
        }
        if self.ic.len() != self.n_public + 1 {
            return Err(VerifierError::MalformedKey(format!(
                "{} public signals need {} ic points, found {}",
                self.n_public,
                self.n_public + 1,
                self.ic.len()
            )));
        }
        Ok(())
    }

    /// Parses and validates a JSON verification key
    pub fn from_json(json: &str) -> Result<Self, VerifierError> {
        let vk: VerifyingKey =
            serde_json::from_str(json).map_err(|e| VerifierError::MalformedKey(e.to_string()))?;
        vk.validate()?;
        Ok(vk)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
