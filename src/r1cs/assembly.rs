use halo2_proofs::halo2curves::bn256::Fr as Fp;
use zeroize::Zeroizing;

use super::{Circuit, Constraint, ConstraintSystem, LinearCombination, R1cs, Variable, Witness};
use crate::errors::SynthesisError;
use crate::utils::secret::SecretScalar;

type Row = [Vec<(Variable, Fp)>; 3];

/// Records the wires and constraints of a circuit. Never evaluates a value closure.
#[derive(Default)]
pub struct ShapeAssembly {
    num_public: usize,
    num_private: usize,
    rows: Vec<Row>,
    annotations: Vec<String>,
}

impl ShapeAssembly {
    pub fn into_r1cs(self) -> R1cs {
        let num_public = self.num_public;
        let to_indices = |terms: &[(Variable, Fp)]| {
            terms
                .iter()
                .map(|(var, coeff)| (var.index(num_public), *coeff))
                .collect::<Vec<_>>()
        };

        let constraints = self
            .rows
            .iter()
            .map(|[a, b, c]| Constraint {
                a: to_indices(a),
                b: to_indices(b),
                c: to_indices(c),
            })
            .collect();

        R1cs::new(
            self.num_public,
            self.num_private,
            constraints,
            self.annotations,
        )
    }
}

impl ConstraintSystem for ShapeAssembly {
    fn alloc_public<A, F>(&mut self, _annotation: A, _value: F) -> Result<Variable, SynthesisError>
    where
        A: FnOnce() -> String,
        F: FnOnce() -> Result<Fp, SynthesisError>,
    {
        self.num_public += 1;
        Ok(Variable::Public(self.num_public - 1))
    }

    fn alloc_private<A, F>(&mut self, _annotation: A, _value: F) -> Result<Variable, SynthesisError>
    where
        A: FnOnce() -> String,
        F: FnOnce() -> Result<Fp, SynthesisError>,
    {
        self.num_private += 1;
        Ok(Variable::Private(self.num_private - 1))
    }

    fn enforce<A>(
        &mut self,
        annotation: A,
        a: LinearCombination,
        b: LinearCombination,
        c: LinearCombination,
    ) where
        A: FnOnce() -> String,
    {
        self.rows.push([a.compact(), b.compact(), c.compact()]);
        self.annotations.push(annotation());
    }
}

/// Evaluates every wire of a circuit. Constraints are ignored here; they are checked
/// against the R1CS instance before proving.
#[derive(Default)]
pub struct WitnessAssembly {
    public: Vec<Fp>,
    private: Zeroizing<Vec<SecretScalar>>,
}

impl WitnessAssembly {
    pub fn synthesize<C: Circuit>(circuit: &C) -> Result<Witness, SynthesisError> {
        let mut assembly = WitnessAssembly::default();
        circuit.synthesize(&mut assembly)?;
        let private = std::mem::take(&mut *assembly.private);
        Ok(Witness::new(assembly.public, private))
    }
}

impl ConstraintSystem for WitnessAssembly {
    fn alloc_public<A, F>(&mut self, _annotation: A, value: F) -> Result<Variable, SynthesisError>
    where
        A: FnOnce() -> String,
        F: FnOnce() -> Result<Fp, SynthesisError>,
    {
        self.public.push(value()?);
        Ok(Variable::Public(self.public.len() - 1))
    }

    fn alloc_private<A, F>(&mut self, _annotation: A, value: F) -> Result<Variable, SynthesisError>
    where
        A: FnOnce() -> String,
        F: FnOnce() -> Result<Fp, SynthesisError>,
    {
        self.private.push(SecretScalar(value()?));
        Ok(Variable::Private(self.private.len() - 1))
    }

    fn enforce<A>(
        &mut self,
        _annotation: A,
        _a: LinearCombination,
        _b: LinearCombination,
        _c: LinearCombination,
    ) where
        A: FnOnce() -> String,
    {
    }
}
