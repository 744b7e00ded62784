use halo2_proofs::halo2curves::{bn256::Fr as Fp, ff::Field};

use crate::chips::boolean::alloc_boolean;
use crate::errors::SynthesisError;
use crate::r1cs::{ConstraintSystem, LinearCombination, Variable};

/// Selects one of `n` wires without revealing which one.
///
/// One indicator wire `s_i` per candidate, each boolean, summing to exactly one, and one
/// product wire `p_i = s_i · v_i` per candidate. The returned combination `Σ p_i` equals the
/// candidate whose indicator is set.
///
/// Constraints: `n` booleanity checks, one linear sum check, `n` multiplications.
#[derive(Debug, Clone, Default)]
pub struct OneHotSelectChip;

impl OneHotSelectChip {
    pub fn construct() -> Self {
        Self
    }

    /// `values` are the candidate wires, `value_fps` their assignment and `index` the private position
    pub fn assign<CS: ConstraintSystem>(
        &self,
        cs: &mut CS,
        values: &[Variable],
        value_fps: Option<&[Fp]>,
        index: Option<usize>,
    ) -> Result<LinearCombination, SynthesisError> {
        let indicators = (0..values.len())
            .map(|i| alloc_boolean(cs, &format!("indicator {}", i), index.map(|idx| idx == i)))
            .collect::<Result<Vec<_>, _>>()?;

        let indicator_sum = indicators
            .iter()
            .fold(LinearCombination::zero(), |lc, s| lc + *s);
        cs.enforce(
            || "exactly one indicator is set".to_owned(),
            indicator_sum,
            Variable::One.into(),
            Variable::One.into(),
        );

        let mut selected = LinearCombination::zero();
        for (i, (value, indicator)) in values.iter().zip(indicators.iter()).enumerate() {
            let product = cs.alloc_private(
                || format!("selected part {}", i),
                || {
                    let (index, value_fps) = index
                        .zip(value_fps)
                        .ok_or(SynthesisError::AssignmentMissing)?;
                    Ok(if index == i { value_fps[i] } else { Fp::ZERO })
                },
            )?;
            cs.enforce(
                || format!("selected part {} = indicator {} * value {}", i, i, i),
                (*indicator).into(),
                (*value).into(),
                product.into(),
            );
            selected = selected + product;
        }

        Ok(selected)
    }
}
