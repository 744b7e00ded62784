//! TOML configuration of the driver binaries. Every field has a default, so an empty or missing
//! file describes the 5 user demo deployment.

use anyhow::{Context, Result};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::circuits::CircuitParams;

const DEFAULT_N_USERS: usize = 5;
const DEFAULT_BALANCE_BITS: usize = 64;
const DEFAULT_POWER: u32 = 12;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservesConfig {
    #[serde(default)]
    pub circuit: CircuitConfig,
    #[serde(default)]
    pub ceremony: CeremonyConfig,
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitConfig {
    #[serde(default = "default_n_users")]
    pub n_users: usize,
    #[serde(default = "default_balance_bits")]
    pub balance_bits: usize,
    /// Decimal string, balances can exceed the TOML integer range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_balance: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CeremonyConfig {
    /// The accumulator supports circuits of up to `2^power` rows
    #[serde(default = "default_power")]
    pub power: u32,
    #[serde(default = "default_contributions")]
    pub phase1_contributions: usize,
    #[serde(default = "default_contributions")]
    pub phase2_contributions: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,
    #[serde(default = "default_ptau_file")]
    pub ptau_file: String,
    #[serde(default = "default_proving_key_file")]
    pub proving_key_file: String,
    #[serde(default = "default_verification_key_file")]
    pub verification_key_file: String,
    #[serde(default = "default_proof_file")]
    pub proof_file: String,
}

impl Default for CircuitConfig {
    fn default() -> Self {
        Self {
            n_users: DEFAULT_N_USERS,
            balance_bits: DEFAULT_BALANCE_BITS,
            max_balance: None,
        }
    }
}

impl Default for CeremonyConfig {
    fn default() -> Self {
        Self {
            power: DEFAULT_POWER,
            phase1_contributions: 1,
            phase2_contributions: 1,
        }
    }
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            build_dir: default_build_dir(),
            ptau_file: default_ptau_file(),
            proving_key_file: default_proving_key_file(),
            verification_key_file: default_verification_key_file(),
            proof_file: default_proof_file(),
        }
    }
}

fn default_n_users() -> usize {
    DEFAULT_N_USERS
}

fn default_balance_bits() -> usize {
    DEFAULT_BALANCE_BITS
}

fn default_power() -> u32 {
    DEFAULT_POWER
}

fn default_contributions() -> usize {
    1
}

fn default_build_dir() -> PathBuf {
    PathBuf::from("build")
}

fn default_ptau_file() -> String {
    "pot_final.ptau".to_owned()
}

fn default_proving_key_file() -> String {
    "proof_of_reserves_final.pk".to_owned()
}

fn default_verification_key_file() -> String {
    "verification_key.json".to_owned()
}

fn default_proof_file() -> String {
    "proof.json".to_owned()
}

impl ReservesConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: ReservesConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Loads `path` when given, the defaults otherwise. A given file that cannot be read is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Circuit dimensions, validated
    pub fn circuit_params(&self) -> Result<CircuitParams> {
        let mut params = CircuitParams::new(self.circuit.n_users, self.circuit.balance_bits);
        if let Some(max_balance) = &self.circuit.max_balance {
            let max_balance = BigUint::parse_bytes(max_balance.trim().as_bytes(), 10)
                .with_context(|| format!("max_balance is not a decimal integer: {}", max_balance))?;
            params = params.with_max_balance(max_balance);
        }
        params.validate().context("Invalid circuit configuration")?;
        Ok(params)
    }

    pub fn ptau_path(&self) -> PathBuf {
        self.artifacts.build_dir.join(&self.artifacts.ptau_file)
    }

    pub fn proving_key_path(&self) -> PathBuf {
        self.artifacts.build_dir.join(&self.artifacts.proving_key_file)
    }

    pub fn verification_key_path(&self) -> PathBuf {
        self.artifacts
            .build_dir
            .join(&self.artifacts.verification_key_file)
    }

    pub fn proof_path(&self) -> PathBuf {
        self.artifacts.build_dir.join(&self.artifacts.proof_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CircuitError;

    #[test]
    fn test_default_config() {
        let config: ReservesConfig = toml::from_str("").unwrap();
        assert_eq!(config, ReservesConfig::default());
        assert_eq!(config.circuit.n_users, 5);
        assert_eq!(config.circuit.balance_bits, 64);
        assert_eq!(config.ceremony.power, 12);
        assert_eq!(config.proof_path(), PathBuf::from("build/proof.json"));
        assert_eq!(config.circuit_params().unwrap(), CircuitParams::new(5, 64));
    }

    #[test]
    fn test_custom_config() {
        let config_toml = r#"
            [circuit]
            n_users = 16
            balance_bits = 8
            max_balance = "255"

            [ceremony]
            power = 8
            phase1_contributions = 3

            [artifacts]
            build_dir = "out"
        "#;
        let config: ReservesConfig = toml::from_str(config_toml).unwrap();

        assert_eq!(config.ceremony.phase1_contributions, 3);
        assert_eq!(config.ceremony.phase2_contributions, 1);
        assert_eq!(
            config.verification_key_path(),
            PathBuf::from("out/verification_key.json")
        );
        assert_eq!(
            config.circuit_params().unwrap(),
            CircuitParams::new(16, 8).with_max_balance(BigUint::from(255u32))
        );
    }

    #[test]
    fn test_invalid_circuit_config() {
        let mut config = ReservesConfig::default();
        config.circuit.balance_bits = 8;
        config.circuit.max_balance = Some("256".to_owned());
        let err = config.circuit_params().unwrap_err();
        assert_eq!(
            err.downcast_ref::<CircuitError>(),
            Some(&CircuitError::InsufficientBitWidth {
                bits: 8,
                max_balance: BigUint::from(256u32)
            })
        );

        config.circuit.max_balance = Some("12.5".to_owned());
        assert!(config.circuit_params().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[circuit]\nn_users = 3\n").unwrap();

        let config = ReservesConfig::load(Some(path.as_path())).unwrap();
        assert_eq!(config.circuit.n_users, 3);
        assert!(ReservesConfig::load(Some(dir.path().join("missing.toml").as_path())).is_err());
    }
}
