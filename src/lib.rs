//! This crate contains the cryptographic primitives for implementing a proof of reserves protocol.
//! A custodian proves that every customer balance is non-negative, that the balances add up to a
//! publicly claimed total and that one given customer is part of that total, without revealing the ledger.
//!
//! The constraint system is a rank-1 constraint system over the BN254 scalar field, proven with a
//! Groth16 style argument whose keys come out of a two-phase multi-party ceremony.
//! Curve, pairing, FFT and multi-scalar multiplication come from [Halo2](https://github.com/summa-dev/halo2).

/// Two phase trusted setup ceremony producing the proving and verification keys.
pub mod ceremony;
/// Zk circuit subcomponents aka chips.
pub mod chips;
/// Proof of reserves circuit, witness generation and the end-to-end setup/prove/verify helpers.
pub mod circuits;
/// TOML configuration shared by the driver binaries.
pub mod config;
pub mod entry;
/// Error taxonomy of the crate.
pub mod errors;
/// Groth16 keys, prover and verifier.
pub mod groth16;
/// Rank-1 constraint system: variables, linear combinations, constraint collection and satisfiability checks.
pub mod r1cs;
pub mod utils;

pub use halo2_proofs::halo2curves::bn256::Fr as Fp;
