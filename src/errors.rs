use num_bigint::{BigInt, BigUint};

/// Configuration errors, raised while building the circuit and before any setup work.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CircuitError {
    #[error("the circuit needs at least one user")]
    NoUsers,

    #[error("balance bit width must be at least 1")]
    ZeroBitWidth,

    #[error("{bits}-bit balances cannot represent the configured maximum balance {max_balance}")]
    InsufficientBitWidth { bits: usize, max_balance: BigUint },

    #[error("{n_users} balances of {bits} bits could overflow the field modulus ({capacity} usable bits)")]
    FieldOverflow {
        n_users: usize,
        bits: usize,
        capacity: u32,
    },
}

/// Which public relation an input failed to satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    UserCount { expected: usize, actual: usize },
    ClaimedTotal { claimed: BigInt, actual: BigInt },
    ExpectedBalance { expected: BigInt, actual: BigInt },
}

impl std::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mismatch::UserCount { expected, actual } => {
                write!(f, "circuit expects {} balances, got {}", expected, actual)
            }
            Mismatch::ClaimedTotal { claimed, actual } => {
                write!(f, "claimed total {} but balances sum to {}", claimed, actual)
            }
            Mismatch::ExpectedBalance { expected, actual } => write!(
                f,
                "expected balance {} but the ledger holds {} at the proven index",
                expected, actual
            ),
        }
    }
}

/// Input errors, raised by the witness generator. Inputs are never clamped or truncated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WitnessError {
    #[error("input mismatch: {0}")]
    InputMismatch(Mismatch),

    #[error("balance {value} at position {position} is outside [0, 2^{bits})")]
    BalanceOutOfRange {
        position: usize,
        value: BigInt,
        bits: usize,
    },

    #[error("proven index {index} is outside [0, {n_users})")]
    IndexOutOfRange { index: usize, n_users: usize },

    #[error(transparent)]
    Circuit(#[from] CircuitError),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
}

/// Errors raised while synthesizing constraints.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SynthesisError {
    #[error("a wire value was requested while collecting the constraint shape")]
    AssignmentMissing,
}

/// Integrity errors on the proving side. Fatal for the call, never retryable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProverError {
    #[error("proving key was generated for circuit {key} but the witness belongs to circuit {circuit}")]
    KeyMismatch { key: String, circuit: String },

    #[error("witness does not satisfy constraint #{index}: {annotation}")]
    Unsatisfied { index: usize, annotation: String },

    #[error("witness has {public} public and {private} private values, circuit expects {expected_public} and {expected_private}")]
    WitnessShape {
        public: usize,
        private: usize,
        expected_public: usize,
        expected_private: usize,
    },

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
}

/// Malformed verifier inputs. A proof that merely fails the pairing check is not an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifierError {
    #[error("malformed verification key: {0}")]
    MalformedKey(String),

    #[error("malformed proof: {0}")]
    MalformedProof(String),

    #[error("verification key expects {expected} public signals, got {actual}")]
    PublicSignalCount { expected: usize, actual: usize },

    #[error("public signal #{index} is not a canonical field element: {value}")]
    MalformedSignal { index: usize, value: String },

    #[error("artifact metadata claims a total of {metadata} but the proven claimed total is {signal}")]
    ClaimedTotalMismatch { metadata: String, signal: String },
}

/// Ceremony errors. Any of these aborts the ceremony; restart from the last good artifact.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    #[error("phase 1 must receive at least one contribution before {0}")]
    MissingPhase1Contribution(&'static str),

    #[error("phase 2 must receive at least one contribution before the keys are exported")]
    MissingPhase2Contribution,

    #[error("contribution #{index} ({name}) is invalid: {reason}")]
    InvalidContribution {
        index: usize,
        name: String,
        reason: String,
    },

    #[error("contribution #{index} ({name}) reuses the randomness of contribution #{previous}")]
    ReusedRandomness {
        index: usize,
        name: String,
        previous: usize,
    },

    #[error("transcript of {phase} is broken at contribution #{index}")]
    BrokenTranscript { phase: &'static str, index: usize },

    #[error("circuit needs a domain of 2^{needed} but the powers of tau only support 2^{available}")]
    CircuitTooLarge { needed: u32, available: u32 },

    #[error("powers of tau size 2^{0} is not supported")]
    UnsupportedPower(u32),

    #[error("phase 2 state belongs to circuit {state} but circuit {circuit} was supplied")]
    CircuitMismatch { state: String, circuit: String },

    #[error("phase 2 state does not derive from the supplied phase 1 transcript")]
    Phase1Mismatch,

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
}

/// Errors raised while reading or writing artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Bincode(#[from] bincode::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("invalid encoding: {0}")]
    Encoding(String),
}
