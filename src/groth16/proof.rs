use halo2_proofs::halo2curves::{
    bn256::{G1Affine, G2Affine},
    group::GroupEncoding,
};
use serde::{Deserialize, Serialize};

use crate::errors::VerifierError;
use crate::utils::encoding::hex_point;

/// Compressed size of a proof: two G1 points and one G2 point
pub const PROOF_SIZE: usize = 32 + 64 + 32;

/// A Groth16 proof. Constant size whatever the ledger holds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Proof {
    #[serde(with = "hex_point")]
    pub a: G1Affine,
    #[serde(with = "hex_point")]
    pub b: G2Affine,
    #[serde(with = "hex_point")]
    pub c: G1Affine,
}

impl Proof {
    pub fn to_bytes(&self) -> [u8; PROOF_SIZE] {
        let mut bytes = [0u8; PROOF_SIZE];
        bytes[..32].copy_from_slice(self.a.to_bytes().as_ref());
        bytes[32..96].copy_from_slice(self.b.to_bytes().as_ref());
        bytes[96..].copy_from_slice(self.c.to_bytes().as_ref());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, VerifierError> {
        if bytes.len() != PROOF_SIZE {
            return Err(VerifierError::MalformedProof(format!(
                "proof must be {} bytes, got {}",
                PROOF_SIZE,
                bytes.len()
            )));
        }
        Ok(Proof {
            a: decode_point(&bytes[..32], "a")?,
            b: decode_point(&bytes[32..96], "b")?,
            c: decode_point(&bytes[96..], "c")?,
        })
    }
}

fn decode_point<C: GroupEncoding>(bytes: &[u8], name: &str) -> Result<C, VerifierError> {
    let mut repr = C::Repr::default();
    repr.as_mut().copy_from_slice(bytes);
    Option::from(C::from_bytes(&repr))
        .ok_or_else(|| VerifierError::MalformedProof(format!("{} is not a curve point", name)))
}

/// Public context written next to a proof. Never carries the proven index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofMetadata {
    pub timestamp: String,
    pub claimed_total: String,
    pub public_wallet_address: String,
    pub description: String,
}

/// What an exchange publishes: the proof, its public signals as decimal strings and the metadata.
/// Signals stay strings so the verifier can reject a non-canonical value instead of reducing it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofArtifact {
    pub proof: Proof,
    pub public_signals: Vec<String>,
    pub metadata: ProofMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;
    use halo2_proofs::halo2curves::{
        bn256::Fr as Fp,
        group::{prime::PrimeCurveAffine, Curve},
    };

    fn sample_proof() -> Proof {
        Proof {
            a: (G1Affine::generator() * Fp::from(3)).to_affine(),
            b: (G2Affine::generator() * Fp::from(5)).to_affine(),
            c: (G1Affine::generator() * Fp::from(7)).to_affine(),
        }
    }

    #[test]
    fn test_proof_bytes() {
        let proof = sample_proof();
        let bytes = proof.to_bytes();
        assert_eq!(bytes.len(), PROOF_SIZE);
        assert_eq!(Proof::from_bytes(&bytes).unwrap(), proof);

        assert!(matches!(
            Proof::from_bytes(&bytes[..100]),
            Err(VerifierError::MalformedProof(_))
        ));
    }

    #[test]
    fn test_artifact_json_layout() {
        let artifact = ProofArtifact {
            proof: sample_proof(),
            public_signals: vec!["20".to_owned(), "10".to_owned()],
            metadata: ProofMetadata {
                timestamp: "2024-01-01T00:00:00Z".to_owned(),
                claimed_total: "20".to_owned(),
                public_wallet_address: "bc1q".to_owned(),
                description: "reserves".to_owned(),
            },
        };
        let json = serde_json::to_value(&artifact).unwrap();
        assert_eq!(json["publicSignals"][0], "20");
        assert_eq!(json["metadata"]["publicWalletAddress"], "bc1q");
        assert!(json["metadata"].get("userIndexProven").is_none());

        let decoded: ProofArtifact = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, artifact);
    }
}
