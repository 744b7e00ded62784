use std::collections::BTreeMap;
use std::ops::{Add, Sub};

use halo2_proofs::halo2curves::{bn256::Fr as Fp, ff::Field};

use super::Variable;

/// A sparse sum `Σ coeff · variable`. Terms are kept as pushed and merged by [`LinearCombination::compact`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinearCombination(Vec<(Variable, Fp)>);

impl LinearCombination {
    pub fn zero() -> Self {
        LinearCombination(vec![])
    }

    pub fn terms(&self) -> &[(Variable, Fp)] {
        &self.0
    }

    /// Evaluates the combination given a lookup for every variable it mentions
    pub fn evaluate<F: Fn(Variable) -> Fp>(&self, value_of: F) -> Fp {
        self.0
            .iter()
            .fold(Fp::ZERO, |acc, (var, coeff)| acc + value_of(*var) * coeff)
    }

    /// Merges duplicate variables and drops zero coefficients, ordered by variable
    pub fn compact(&self) -> Vec<(Variable, Fp)> {
        let mut merged: BTreeMap<Variable, Fp> = BTreeMap::new();
        for (var, coeff) in &self.0 {
            *merged.entry(*var).or_insert(Fp::ZERO) += coeff;
        }
        merged
            .into_iter()
            .filter(|(_, coeff)| !bool::from(coeff.is_zero()))
            .collect()
    }
}

impl From<Variable> for LinearCombination {
    fn from(var: Variable) -> Self {
        LinearCombination(vec![(var, Fp::ONE)])
    }
}

impl Add<Variable> for LinearCombination {
    type Output = LinearCombination;

    fn add(mut self, var: Variable) -> LinearCombination {
        self.0.push((var, Fp::ONE));
        self
    }
}

impl Sub<Variable> for LinearCombination {
    type Output = LinearCombination;

    fn sub(mut self, var: Variable) -> LinearCombination {
        self.0.push((var, -Fp::ONE));
        self
    }
}

impl Add<(Fp, Variable)> for LinearCombination {
    type Output = LinearCombination;

    fn add(mut self, (coeff, var): (Fp, Variable)) -> LinearCombination {
        self.0.push((var, coeff));
        self
    }
}

impl Add<&LinearCombination> for LinearCombination {
    type Output = LinearCombination;

    fn add(mut self, other: &LinearCombination) -> LinearCombination {
        self.0.extend_from_slice(&other.0);
        self
    }
}
