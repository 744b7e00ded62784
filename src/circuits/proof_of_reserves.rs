use halo2_proofs::halo2curves::{
    bn256::Fr as Fp,
    ff::{Field, PrimeField},
};
use num_bigint::BigUint;

use crate::chips::one_hot::OneHotSelectChip;
use crate::chips::range::range_check::RangeCheckChip;
use crate::circuits::witness::{validate_request, ProofRequest};
use crate::circuits::WithInstances;
use crate::errors::{CircuitError, SynthesisError, WitnessError};
use crate::r1cs::{Circuit, ConstraintSystem, LinearCombination, Variable};

/// The dimensions of one circuit of the family: user count and balance bit width.
/// Any change produces a different constraint system and requires a fresh ceremony.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CircuitParams {
    pub n_users: usize,
    pub balance_bits: usize,
    /// Largest balance the deployment expects; checked against `balance_bits` at construction
    pub max_balance: Option<BigUint>,
}

impl CircuitParams {
    pub fn new(n_users: usize, balance_bits: usize) -> Self {
        CircuitParams {
            n_users,
            balance_bits,
            max_balance: None,
        }
    }

    pub fn with_max_balance(mut self, max_balance: BigUint) -> Self {
        self.max_balance = Some(max_balance);
        self
    }

    pub fn validate(&self) -> Result<(), CircuitError> {
        if self.n_users == 0 {
            return Err(CircuitError::NoUsers);
        }
        if self.balance_bits == 0 {
            return Err(CircuitError::ZeroBitWidth);
        }
        if let Some(max_balance) = &self.max_balance {
            if max_balance.bits() > self.balance_bits as u64 {
                return Err(CircuitError::InsufficientBitWidth {
                    bits: self.balance_bits,
                    max_balance: max_balance.clone(),
                });
            }
        }

        // N balances below 2^bits sum to less than 2^(bits + ceil(log2 N))
        let capacity = Fp::CAPACITY;
        let sum_bits = self.balance_bits + ceil_log2(self.n_users);
        if sum_bits > capacity as usize {
            return Err(CircuitError::FieldOverflow {
                n_users: self.n_users,
                bits: self.balance_bits,
                capacity,
            });
        }

        Ok(())
    }

    /// `N · (bits + 3) + 3`
    pub fn num_constraints(&self) -> usize {
        self.n_users * (self.balance_bits + 3) + 3
    }
}

fn ceil_log2(n: usize) -> usize {
    (usize::BITS - n.saturating_sub(1).leading_zeros()) as usize
}

/// Proves that there is a private list of balances and a private index such that every balance
/// lies in `[0, 2^bits)`, the balances sum to the public claimed total and the balance at the
/// index equals the public expected balance.
///
/// Public signals, in order: `[claimed_total, expected_balance]`.
#[derive(Clone)]
pub struct ProofOfReservesCircuit {
    params: CircuitParams,
    balances: Vec<Fp>,
    proven_index: usize,
    claimed_total: Fp,
    expected_balance: Fp,
}

impl ProofOfReservesCircuit {
    /// A circuit with every wire set to zero, enough to derive the constraint system
    pub fn init_empty(params: CircuitParams) -> Result<Self, CircuitError> {
        params.validate()?;
        Ok(Self {
            balances: vec![Fp::ZERO; params.n_users],
            params,
            proven_index: 0,
            claimed_total: Fp::ZERO,
            expected_balance: Fp::ZERO,
        })
    }

    /// Validates `request` against the circuit dimensions and fills in the wire values
    pub fn init(params: CircuitParams, request: &ProofRequest) -> Result<Self, WitnessError> {
        params.validate()?;
        let inputs = validate_request(&params, request)?;
        Ok(Self {
            params,
            balances: inputs.balances,
            proven_index: request.proven_index,
            claimed_total: inputs.claimed_total,
            expected_balance: inputs.expected_balance,
        })
    }

    pub fn params(&self) -> &CircuitParams {
        &self.params
    }
}

impl std::fmt::Debug for ProofOfReservesCircuit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProofOfReservesCircuit")
            .field("params", &self.params)
            .field("claimed_total", &self.claimed_total)
            .field("expected_balance", &self.expected_balance)
            .finish_non_exhaustive()
    }
}

impl WithInstances for ProofOfReservesCircuit {
    fn num_instances(&self) -> usize {
        2
    }

    fn instances(&self) -> Vec<Fp> {
        vec![self.claimed_total, self.expected_balance]
    }
}

impl Circuit for ProofOfReservesCircuit {
    fn synthesize<CS: ConstraintSystem>(&self, cs: &mut CS) -> Result<(), SynthesisError> {
        let claimed_total =
            cs.alloc_public(|| "claimed total".to_owned(), || Ok(self.claimed_total))?;
        let expected_balance =
            cs.alloc_public(|| "expected balance".to_owned(), || Ok(self.expected_balance))?;

        let balances = self
            .balances
            .iter()
            .enumerate()
            .map(|(i, balance)| cs.alloc_private(|| format!("balance {}", i), || Ok(*balance)))
            .collect::<Result<Vec<Variable>, _>>()?;

        // Non-negativity and boundedness of every balance
        let range_chip = RangeCheckChip::construct(self.params.balance_bits);
        for (i, (balance, value)) in balances.iter().zip(self.balances.iter()).enumerate() {
            range_chip.assign(cs, &format!("balance {}", i), *balance, Some(*value))?;
        }

        let total = balances
            .iter()
            .fold(LinearCombination::zero(), |lc, balance| lc + *balance);
        cs.enforce(
            || "balances sum to the claimed total".to_owned(),
            total,
            Variable::One.into(),
            claimed_total.into(),
        );

        let selected = OneHotSelectChip::construct().assign(
            cs,
            &balances,
            Some(&self.balances),
            Some(self.proven_index),
        )?;
        cs.enforce(
            || "selected balance equals the expected balance".to_owned(),
            selected,
            Variable::One.into(),
            expected_balance.into(),
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_validation() {
        assert_eq!(CircuitParams::new(5, 8).validate(), Ok(()));
        assert_eq!(
            CircuitParams::new(0, 8).validate(),
            Err(CircuitError::NoUsers)
        );
        assert_eq!(
            CircuitParams::new(5, 0).validate(),
            Err(CircuitError::ZeroBitWidth)
        );
        assert_eq!(
            CircuitParams::new(5, 8)
                .with_max_balance(BigUint::from(255u32))
                .validate(),
            Ok(())
        );
        assert_eq!(
            CircuitParams::new(5, 8)
                .with_max_balance(BigUint::from(256u32))
                .validate(),
            Err(CircuitError::InsufficientBitWidth {
                bits: 8,
                max_balance: BigUint::from(256u32)
            })
        );
    }

    #[test]
    fn test_params_reject_field_overflow() {
        // 253 bits is the most a single balance may take
        assert_eq!(CircuitParams::new(1, 253).validate(), Ok(()));
        assert!(matches!(
            CircuitParams::new(2, 253).validate(),
            Err(CircuitError::FieldOverflow { capacity: 253, .. })
        ));
        assert_eq!(CircuitParams::new(1 << 20, 233).validate(), Ok(()));
        assert!(matches!(
            CircuitParams::new((1 << 20) + 1, 233).validate(),
            Err(CircuitError::FieldOverflow { .. })
        ));
    }

    #[test]
    fn test_ceil_log2() {
        assert_eq!(ceil_log2(1), 0);
        assert_eq!(ceil_log2(2), 1);
        assert_eq!(ceil_log2(5), 3);
        assert_eq!(ceil_log2(8), 3);
        assert_eq!(ceil_log2(9), 4);
    }

    #[test]
    fn test_empty_circuit_exposes_zero_instances() {
        let circuit = ProofOfReservesCircuit::init_empty(CircuitParams::new(3, 4)).unwrap();
        assert_eq!(circuit.num_instances(), 2);
        assert_eq!(circuit.instances(), vec![Fp::ZERO, Fp::ZERO]);
        assert!(format!("{:?}", circuit).contains("n_users: 3"));
    }
}
