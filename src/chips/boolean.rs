use halo2_proofs::halo2curves::{bn256::Fr as Fp, ff::Field};

use crate::errors::SynthesisError;
use crate::r1cs::{ConstraintSystem, LinearCombination, Variable};

/// Allocates a private wire holding `value` and constrains it to `{0, 1}`
pub fn alloc_boolean<CS: ConstraintSystem>(
    cs: &mut CS,
    label: &str,
    value: Option<bool>,
) -> Result<Variable, SynthesisError> {
    let bit = cs.alloc_private(
        || label.to_owned(),
        || {
            value
                .map(|bit| if bit { Fp::ONE } else { Fp::ZERO })
                .ok_or(SynthesisError::AssignmentMissing)
        },
    )?;
    enforce_boolean(cs, label, bit);
    Ok(bit)
}

/// `b · (1 - b) = 0`
pub fn enforce_boolean<CS: ConstraintSystem>(cs: &mut CS, label: &str, bit: Variable) {
    cs.enforce(
        || format!("{} is boolean", label),
        bit.into(),
        LinearCombination::from(Variable::One) - bit,
        LinearCombination::zero(),
    );
}
