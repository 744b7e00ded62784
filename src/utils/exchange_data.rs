use std::path::Path;

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use super::encoding::load_json;
use crate::circuits::witness::ProofRequest;
use crate::entry::Entry;
use crate::errors::{ArtifactError, Mismatch, WitnessError};

/// One ledger row of the exchange data file. Balances are integers in the smallest asset unit,
/// so a fractional amount fails to parse.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub balance: i128,
}

/// The exchange data file: the private ledger next to the public claim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeData {
    pub users: Vec<ExchangeUser>,
    pub total_reserves: i128,
    pub public_wallet_address: String,
}

impl ExchangeData {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ArtifactError> {
        load_json(path)
    }

    /// Ledger entries, unnamed users get `user_{index}`
    pub fn entries(&self) -> Vec<Entry> {
        self.users
            .iter()
            .enumerate()
            .map(|(i, user)| {
                let username = user
                    .username
                    .clone()
                    .unwrap_or_else(|| format!("user_{}", i));
                Entry::new(username, BigInt::from(user.balance))
            })
            .collect()
    }

    pub fn actual_sum(&self) -> BigInt {
        self.users.iter().map(|user| BigInt::from(user.balance)).sum()
    }

    /// The ledger must add up to the claimed reserves before anything is proven
    pub fn check_consistency(&self) -> Result<(), WitnessError> {
        let actual = self.actual_sum();
        let claimed = BigInt::from(self.total_reserves);
        if actual != claimed {
            return Err(WitnessError::InputMismatch(Mismatch::ClaimedTotal {
                claimed,
                actual,
            }));
        }
        Ok(())
    }

    /// Request proving that the user at `user_index` is included in the claimed reserves
    pub fn proof_request(&self, user_index: usize) -> Result<ProofRequest, WitnessError> {
        ProofRequest::from_entries(
            &self.entries(),
            user_index,
            BigInt::from(self.total_reserves),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_exchange_data() {
        let data = ExchangeData::load("data/exchange_data.json").unwrap();
        assert_eq!(data.users.len(), 5);
        assert_eq!(data.total_reserves, 20);
        assert_eq!(
            data.public_wallet_address,
            "bc1qxy2kgdygjrsqtzq2n0yrf2493p83kkfjhx0wlh"
        );
        assert!(data.check_consistency().is_ok());

        let request = data.proof_request(2).unwrap();
        assert_eq!(request.proven_index, 2);
        assert_eq!(request.expected_balance, BigInt::from(0));
        assert_eq!(request.claimed_total, BigInt::from(20));
        assert_eq!(data.entries()[3].username(), "dave");
    }

    #[test]
    fn test_inconsistent_total() {
        let data: ExchangeData = serde_json::from_str(
            r#"{"users":[{"balance":3},{"balance":5}],"totalReserves":9,"publicWalletAddress":"addr"}"#,
        )
        .unwrap();

        assert_eq!(data.entries()[1].username(), "user_1");
        assert_eq!(
            data.check_consistency().unwrap_err(),
            WitnessError::InputMismatch(Mismatch::ClaimedTotal {
                claimed: BigInt::from(9),
                actual: BigInt::from(8),
            })
        );
        assert_eq!(
            data.proof_request(2).unwrap_err(),
            WitnessError::IndexOutOfRange {
                index: 2,
                n_users: 2
            }
        );
    }

    #[test]
    fn test_fractional_balance_is_rejected() {
        let parsed = serde_json::from_str::<ExchangeData>(
            r#"{"users":[{"balance":0.5}],"totalReserves":1,"publicWalletAddress":"addr"}"#,
        );
        assert!(parsed.is_err());
    }
}
