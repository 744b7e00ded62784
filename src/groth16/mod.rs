pub(crate) mod domain;
pub mod keys;
pub mod proof;
mod prover;
mod verifier;

pub use keys::{ProvingKey, VerifyingKey};
pub use proof::{Proof, ProofArtifact, ProofMetadata, PROOF_SIZE};
pub use prover::create_proof;
pub use verifier::{parse_public_signals, verify_artifact, verify_proof};
