use halo2_proofs::halo2curves::{bn256::Fr as Fp, ff::Field};
use num_bigint::BigInt;
use num_traits::Signed;

use crate::circuits::proof_of_reserves::{CircuitParams, ProofOfReservesCircuit};
use crate::entry::Entry;
use crate::errors::{Mismatch, WitnessError};
use crate::r1cs::{Witness, WitnessAssembly};
use crate::utils::{big_int_to_canonical_fp, pow_of_two};

/// Private and public inputs of one proof.
///
/// `balances` and `proven_index` are private; `claimed_total` and `expected_balance` become the
/// public signals.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProofRequest {
    pub balances: Vec<BigInt>,
    pub proven_index: usize,
    pub claimed_total: BigInt,
    pub expected_balance: BigInt,
}

impl ProofRequest {
    pub fn new(
        balances: Vec<BigInt>,
        proven_index: usize,
        claimed_total: BigInt,
        expected_balance: BigInt,
    ) -> Self {
        ProofRequest {
            balances,
            proven_index,
            claimed_total,
            expected_balance,
        }
    }

    /// Builds a request proving the inclusion of `entries[proven_index]`, its ledger balance
    /// used as the expected balance
    pub fn from_entries(
        entries: &[Entry],
        proven_index: usize,
        claimed_total: BigInt,
    ) -> Result<Self, WitnessError> {
        let expected_balance = entries
            .get(proven_index)
            .ok_or(WitnessError::IndexOutOfRange {
                index: proven_index,
                n_users: entries.len(),
            })?
            .balance()
            .clone();

        Ok(ProofRequest {
            balances: entries.iter().map(|entry| entry.balance().clone()).collect(),
            proven_index,
            claimed_total,
            expected_balance,
        })
    }
}

/// Field values of a request that passed validation
pub(crate) struct ValidatedInputs {
    pub balances: Vec<Fp>,
    pub claimed_total: Fp,
    pub expected_balance: Fp,
}

/// Checks, in order: user count, index range, the range of every balance, the claimed total and
/// the expected balance. Nothing is clamped or truncated.
pub(crate) fn validate_request(
    params: &CircuitParams,
    request: &ProofRequest,
) -> Result<ValidatedInputs, WitnessError> {
    if request.balances.len() != params.n_users {
        return Err(WitnessError::InputMismatch(Mismatch::UserCount {
            expected: params.n_users,
            actual: request.balances.len(),
        }));
    }

    if request.proven_index >= params.n_users {
        return Err(WitnessError::IndexOutOfRange {
            index: request.proven_index,
            n_users: params.n_users,
        });
    }

    let bound = pow_of_two(params.balance_bits);
    let balances = request
        .balances
        .iter()
        .enumerate()
        .map(|(position, value)| {
            let out_of_range = || WitnessError::BalanceOutOfRange {
                position,
                value: value.clone(),
                bits: params.balance_bits,
            };
            if value.is_negative() || value >= &bound {
                return Err(out_of_range());
            }
            big_int_to_canonical_fp(value).ok_or_else(out_of_range)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let actual_total: BigInt = request.balances.iter().sum();
    if actual_total != request.claimed_total {
        return Err(WitnessError::InputMismatch(Mismatch::ClaimedTotal {
            claimed: request.claimed_total.clone(),
            actual: actual_total,
        }));
    }

    let actual_balance = &request.balances[request.proven_index];
    if actual_balance != &request.expected_balance {
        return Err(WitnessError::InputMismatch(Mismatch::ExpectedBalance {
            expected: request.expected_balance.clone(),
            actual: actual_balance.clone(),
        }));
    }

    // The integer sum matched and stays below the modulus, so the field sum is the claimed total
    let claimed_total = balances.iter().fold(Fp::ZERO, |acc, balance| acc + balance);
    let expected_balance = balances[request.proven_index];

    Ok(ValidatedInputs {
        balances,
        claimed_total,
        expected_balance,
    })
}

/// Evaluates every wire of the circuit for `request`.
/// The witness stays in memory and is meant to be consumed by a single proof.
pub fn generate_witness(
    params: &CircuitParams,
    request: &ProofRequest,
) -> Result<Witness, WitnessError> {
    let circuit = ProofOfReservesCircuit::init(params.clone(), request)?;
    let witness = WitnessAssembly::synthesize(&circuit)?;
    log::debug!(
        "generated witness with {} private values for {} users",
        witness.num_private(),
        params.n_users
    );
    Ok(witness)
}
