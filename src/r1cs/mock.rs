use halo2_proofs::halo2curves::bn256::Fr as Fp;

use super::{Circuit, R1cs, Variable, WitnessAssembly};
use crate::errors::SynthesisError;

/// A constraint the mock assignment violates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyFailure {
    pub index: usize,
    pub annotation: String,
}

/// Runs a circuit without any cryptography and reports every unsatisfied constraint.
/// Assignments can be tampered with to exercise the soundness of gadgets.
pub struct MockProver {
    r1cs: R1cs,
    z: Vec<Fp>,
}

impl MockProver {
    pub fn run<C: Circuit>(circuit: &C) -> Result<Self, SynthesisError> {
        let r1cs = R1cs::from_circuit(circuit)?;
        let witness = WitnessAssembly::synthesize(circuit)?;
        let z = witness.assignment();
        Ok(MockProver { r1cs, z })
    }

    pub fn r1cs(&self) -> &R1cs {
        &self.r1cs
    }

    pub fn value(&self, var: Variable) -> Fp {
        self.z[var.index(self.r1cs.num_public())]
    }

    /// Overwrites a single wire of the assignment
    pub fn set_value(&mut self, var: Variable, value: Fp) {
        let index = var.index(self.r1cs.num_public());
        self.z[index] = value;
    }

    pub fn verify(&self) -> Result<(), Vec<VerifyFailure>> {
        let failures: Vec<VerifyFailure> = self
            .r1cs
            .constraints()
            .iter()
            .enumerate()
            .filter(|(_, constraint)| !constraint.is_satisfied(&self.z))
            .map(|(index, _)| VerifyFailure {
                index,
                annotation: self.r1cs.annotation(index).to_owned(),
            })
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(failures)
        }
    }

    pub fn assert_satisfied(&self) {
        if let Err(failures) = self.verify() {
            for failure in &failures {
                eprintln!("{:?}", failure);
            }
            panic!("circuit was not satisfied");
        }
    }
}
