use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

/// A row of the custodian's private ledger.
/// The balance is kept signed so that a corrupted negative balance reaches the witness generator
/// and gets rejected there instead of silently wrapping around the field modulus.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    username: String,
    balance: BigInt,
}

impl Entry {
    pub fn new(username: String, balance: BigInt) -> Self {
        Entry { username, balance }
    }

    pub fn init_empty() -> Self {
        Entry {
            username: String::new(),
            balance: BigInt::from(0u32),
        }
    }

    pub fn balance(&self) -> &BigInt {
        &self.balance
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}
