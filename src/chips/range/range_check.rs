use halo2_proofs::halo2curves::bn256::Fr as Fp;

use super::utils::{decompose_fp_to_bits, pow_of_two};
use crate::chips::boolean::alloc_boolean;
use crate::errors::SynthesisError;
use crate::r1cs::{ConstraintSystem, LinearCombination, Variable};

/// Helper chip that verifies that the value witnessed in a given wire lies within `[0, 2^bits)`.
///
/// | wire        | role                         | constraint                          |
/// |-------------|------------------------------|-------------------------------------|
/// | `b_0`       | least significant bit        | `b_0 · (1 - b_0) = 0`               |
/// | ...         |                              |                                     |
/// | `b_{n-1}`   | most significant bit         | `b_{n-1} · (1 - b_{n-1}) = 0`       |
/// | `value`     | the checked wire             | `(Σ 2^k · b_k) · 1 = value`         |
///
/// A value outside the range, including a "negative" value that wrapped around the modulus,
/// has no bit decomposition of length `bits`, so the reconstruction constraint cannot hold
/// as long as `bits` stays below the field capacity.
#[derive(Debug, Clone)]
pub struct RangeCheckChip {
    bits: usize,
}

impl RangeCheckChip {
    pub fn construct(bits: usize) -> Self {
        Self { bits }
    }

    pub fn bits(&self) -> usize {
        self.bits
    }

    /// Decomposes `value` into `bits` boolean wires and ties their weighted sum back to `value`.
    /// Returns the bit wires, least significant first.
    pub fn assign<CS: ConstraintSystem>(
        &self,
        cs: &mut CS,
        label: &str,
        value: Variable,
        value_fp: Option<Fp>,
    ) -> Result<Vec<Variable>, SynthesisError> {
        let decomposition = value_fp.map(|v| decompose_fp_to_bits(v, self.bits));

        let bits = (0..self.bits)
            .map(|k| {
                alloc_boolean(
                    cs,
                    &format!("{} bit {}", label, k),
                    decomposition.as_ref().map(|bits| bits[k]),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let recomposed = bits
            .iter()
            .enumerate()
            .fold(LinearCombination::zero(), |lc, (k, bit)| {
                lc + (pow_of_two(k), *bit)
            });

        cs.enforce(
            || format!("{} equals its {}-bit decomposition", label, self.bits),
            recomposed,
            Variable::One.into(),
            value.into(),
        );

        Ok(bits)
    }
}
