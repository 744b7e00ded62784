pub mod proof_of_reserves;
mod tests;
pub mod utils;
pub mod witness;

pub use proof_of_reserves::{CircuitParams, ProofOfReservesCircuit};
pub use witness::{generate_witness, ProofRequest};

use halo2_proofs::halo2curves::bn256::Fr as Fp;

pub trait WithInstances {
    fn num_instances(&self) -> usize;
    fn instances(&self) -> Vec<Fp>;
}
