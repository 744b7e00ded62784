use num_bigint::BigInt;
use rand::{distributions::Alphanumeric, Rng};
use rayon::prelude::*;

use crate::entry::Entry;

// This is for benchmarking with a large ledger instead of using a CSV file.
// Balances stay below 2^32 so they pass any range check of at least 32 bits.
pub fn generate_dummy_balances(n_users: usize) -> Vec<Entry> {
    let mut entries: Vec<Entry> = vec![Entry::init_empty(); n_users];

    entries.par_iter_mut().for_each(|entry| {
        let mut rng = rand::thread_rng();

        let username: String = (0..10).map(|_| rng.sample(Alphanumeric) as char).collect();

        let balance = BigInt::from(rng.gen_range(1000..90000) as u32);

        *entry = Entry::new(username, balance);
    });

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_dummy_balances() {
        const N_USERS: usize = 1 << 12;

        let entries = generate_dummy_balances(N_USERS);

        assert_eq!(entries.len(), N_USERS);
        for entry in entries {
            assert!(!entry.username().is_empty());
            assert!(entry.balance() >= &BigInt::from(1000));
            assert!(entry.balance() < &BigInt::from(90000));
        }
    }
}
