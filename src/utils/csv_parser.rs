use num_bigint::BigInt;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;

use crate::entry::Entry;
use crate::errors::ArtifactError;

#[derive(Debug, Deserialize)]
struct CsvEntry {
    username: String,
    balance: String,
}

/// Reads a `username;balance` ledger. Balances are signed integers in the smallest asset unit;
/// range checks are left to the witness generator.
pub fn parse_csv_to_entries<P: AsRef<Path>>(path: P) -> Result<Vec<Entry>, ArtifactError> {
    let mut entries = Vec::new();
    let file = File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';') // The fields are separated by a semicolon
        .from_reader(file);

    for (i, result) in rdr.deserialize().enumerate() {
        let record: CsvEntry = result?;
        let balance = BigInt::parse_bytes(record.balance.trim().as_bytes(), 10).ok_or_else(|| {
            ArtifactError::Encoding(format!(
                "balance of row {} ({}) is not an integer: {}",
                i, record.username, record.balance
            ))
        })?;
        entries.push(Entry::new(record.username, balance));
    }

    Ok(entries)
}
