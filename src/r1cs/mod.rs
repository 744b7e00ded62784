mod assembly;
mod linear_combination;
mod mock;

pub use assembly::{ShapeAssembly, WitnessAssembly};
pub use linear_combination::LinearCombination;
pub use mock::{MockProver, VerifyFailure};

use halo2_proofs::halo2curves::{
    bn256::Fr as Fp,
    ff::{Field, PrimeField},
};
use sha3::{Digest, Keccak256};
use zeroize::Zeroizing;

use crate::errors::{ProverError, SynthesisError};
use crate::utils::secret::SecretScalar;

/// A wire of the circuit.
///
/// In the flattened assignment vector `z = [1, public.., private..]` the constant sits at 0,
/// public wires follow it and private wires come last.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Variable {
    One,
    Public(usize),
    Private(usize),
}

impl Variable {
    /// Position of the variable inside `z` for a circuit with `num_public` public wires
    pub fn index(&self, num_public: usize) -> usize {
        match self {
            Variable::One => 0,
            Variable::Public(i) => 1 + i,
            Variable::Private(i) => 1 + num_public + i,
        }
    }
}

/// Something that collects wires and constraints while a circuit is synthesized.
///
/// Value closures are only called by assemblies that need concrete values, so a circuit
/// without witnesses can still be laid out.
pub trait ConstraintSystem {
    fn alloc_public<A, F>(&mut self, annotation: A, value: F) -> Result<Variable, SynthesisError>
    where
        A: FnOnce() -> String,
        F: FnOnce() -> Result<Fp, SynthesisError>;

    fn alloc_private<A, F>(&mut self, annotation: A, value: F) -> Result<Variable, SynthesisError>
    where
        A: FnOnce() -> String,
        F: FnOnce() -> Result<Fp, SynthesisError>;

    /// Enforces `a · b = c`
    fn enforce<A>(
        &mut self,
        annotation: A,
        a: LinearCombination,
        b: LinearCombination,
        c: LinearCombination,
    ) where
        A: FnOnce() -> String;
}

/// A circuit lays out its wires and constraints on any [`ConstraintSystem`].
pub trait Circuit {
    fn synthesize<CS: ConstraintSystem>(&self, cs: &mut CS) -> Result<(), SynthesisError>;
}

/// One row `<a, z> · <b, z> = <c, z>`, terms indexed into `z`.
#[derive(Clone, Debug, PartialEq)]
pub struct Constraint {
    pub a: Vec<(usize, Fp)>,
    pub b: Vec<(usize, Fp)>,
    pub c: Vec<(usize, Fp)>,
}

fn dot(terms: &[(usize, Fp)], z: &[Fp]) -> Fp {
    terms
        .iter()
        .fold(Fp::ZERO, |acc, (index, coeff)| acc + z[*index] * coeff)
}

impl Constraint {
    pub fn evaluate(&self, z: &[Fp]) -> (Fp, Fp, Fp) {
        (dot(&self.a, z), dot(&self.b, z), dot(&self.c, z))
    }

    pub fn is_satisfied(&self, z: &[Fp]) -> bool {
        let (a, b, c) = self.evaluate(z);
        a * b == c
    }
}

/// Summary of an R1CS instance
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct R1csInfo {
    pub constraints: usize,
    pub public_inputs: usize,
    pub private_inputs: usize,
    pub wires: usize,
}

impl std::fmt::Display for R1csInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "# of Constraints: {}", self.constraints)?;
        writeln!(f, "# of Public Inputs: {}", self.public_inputs)?;
        writeln!(f, "# of Private Inputs: {}", self.private_inputs)?;
        write!(f, "# of Wires: {}", self.wires)
    }
}

/// The immutable constraint system of one circuit definition, shared by setup, proving and checks.
#[derive(Clone, Debug, PartialEq)]
pub struct R1cs {
    num_public: usize,
    num_private: usize,
    constraints: Vec<Constraint>,
    annotations: Vec<String>,
}

impl R1cs {
    /// Lays out `circuit` without touching any witness value
    pub fn from_circuit<C: Circuit>(circuit: &C) -> Result<Self, SynthesisError> {
        let mut assembly = ShapeAssembly::default();
        circuit.synthesize(&mut assembly)?;
        Ok(assembly.into_r1cs())
    }

    pub(crate) fn new(
        num_public: usize,
        num_private: usize,
        constraints: Vec<Constraint>,
        annotations: Vec<String>,
    ) -> Self {
        R1cs {
            num_public,
            num_private,
            constraints,
            annotations,
        }
    }

    pub fn num_public(&self) -> usize {
        self.num_public
    }

    pub fn num_private(&self) -> usize {
        self.num_private
    }

    /// Length of `z`, the constant wire included
    pub fn num_variables(&self) -> usize {
        1 + self.num_public + self.num_private
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn annotation(&self, index: usize) -> &str {
        self.annotations
            .get(index)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn info(&self) -> R1csInfo {
        R1csInfo {
            constraints: self.constraints.len(),
            public_inputs: self.num_public,
            private_inputs: self.num_private,
            wires: self.num_variables(),
        }
    }

    /// Keccak digest of the constraint system. Keys carry it so that a key built for another
    /// circuit version is refused. Annotations do not contribute.
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = Keccak256::new();
        hasher.update(b"reserves-r1cs-v1");
        hasher.update((self.num_public as u64).to_le_bytes());
        hasher.update((self.num_private as u64).to_le_bytes());
        hasher.update((self.constraints.len() as u64).to_le_bytes());
        for constraint in &self.constraints {
            for terms in [&constraint.a, &constraint.b, &constraint.c] {
                hasher.update((terms.len() as u64).to_le_bytes());
                for (index, coeff) in terms {
                    hasher.update((*index as u64).to_le_bytes());
                    hasher.update(coeff.to_repr().as_ref());
                }
            }
        }
        hasher.finalize().into()
    }

    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest())
    }

    /// Checks the witness against every constraint, returning the first violation
    pub fn check_witness(&self, witness: &Witness) -> Result<(), ProverError> {
        if witness.public.len() != self.num_public || witness.private.len() != self.num_private {
            return Err(ProverError::WitnessShape {
                public: witness.public.len(),
                private: witness.private.len(),
                expected_public: self.num_public,
                expected_private: self.num_private,
            });
        }

        let z = witness.assignment();
        match self
            .constraints
            .iter()
            .position(|constraint| !constraint.is_satisfied(&z))
        {
            Some(index) => Err(ProverError::Unsatisfied {
                index,
                annotation: self.annotation(index).to_owned(),
            }),
            None => Ok(()),
        }
    }
}

/// A full assignment for one circuit and one set of inputs.
///
/// Private values are wiped when the witness is dropped. The type is neither serializable nor
/// cloneable: it lives in memory for a single proof.
pub struct Witness {
    public: Vec<Fp>,
    private: Zeroizing<Vec<SecretScalar>>,
}

impl Witness {
    pub(crate) fn new(public: Vec<Fp>, private: Vec<SecretScalar>) -> Self {
        Witness {
            public,
            private: Zeroizing::new(private),
        }
    }

    /// Values of the public wires, in allocation order
    pub fn public_inputs(&self) -> &[Fp] {
        &self.public
    }

    pub fn num_private(&self) -> usize {
        self.private.len()
    }

    /// The flattened assignment `z = [1, public.., private..]`, built for a single computation
    /// and dropped right after it.
    pub(crate) fn assignment(&self) -> Vec<Fp> {
        let mut z = Vec::with_capacity(1 + self.public.len() + self.private.len());
        z.push(Fp::ONE);
        z.extend_from_slice(&self.public);
        z.extend(self.private.iter().map(|value| value.0));
        z
    }
}

impl std::fmt::Debug for Witness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Witness")
            .field("public", &self.public)
            .field("private", &format!("<{} hidden values>", self.private.len()))
            .finish()
    }
}
