pub mod phase1;
pub mod phase2;
mod transcript;

pub use phase1::{Phase1Contribution, PowersOfTau, PreparedPhase1};
pub use phase2::{Phase2, Phase2Contribution};
pub use transcript::{contributor_rng, ContributorRng, PublicKey};

use rand::RngCore;

use crate::errors::SetupError;
use crate::groth16::{ProvingKey, VerifyingKey};
use crate::r1cs::R1cs;

/// Runs both phases in one process, one contribution per name, and exports the key pair.
///
/// Meant for tests and local deployments: a real ceremony hands the serialized state from one
/// contributor to the next instead.
pub fn run_ceremony<R: RngCore>(
    r1cs: &R1cs,
    power: u32,
    phase1_names: &[&str],
    phase2_names: &[&str],
    rng: &mut R,
) -> Result<(ProvingKey, VerifyingKey), SetupError> {
    let mut ptau = PowersOfTau::new(power)?;
    for name in phase1_names {
        ptau = ptau.contribute(name, &mut *rng)?;
    }
    let prepared = ptau.prepare_phase2()?;

    let mut phase2 = Phase2::initialize(r1cs, &prepared)?;
    for name in phase2_names {
        phase2 = phase2.contribute(name, &mut *rng)?;
    }
    phase2.finalize(r1cs, &prepared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuits::proof_of_reserves::{CircuitParams, ProofOfReservesCircuit};
    use rand::{rngs::StdRng, SeedableRng};

    fn r1cs(n_users: usize, balance_bits: usize) -> R1cs {
        let circuit =
            ProofOfReservesCircuit::init_empty(CircuitParams::new(n_users, balance_bits)).unwrap();
        R1cs::from_circuit(&circuit).unwrap()
    }

    fn prepared(power: u32, names: &[&str], rng: &mut StdRng) -> PreparedPhase1 {
        let mut ptau = PowersOfTau::new(power).unwrap();
        for name in names {
            ptau = ptau.contribute(name, &mut *rng).unwrap();
        }
        ptau.prepare_phase2().unwrap()
    }

    #[test]
    fn test_full_ceremony() {
        let mut rng = StdRng::seed_from_u64(42);
        let r1cs = r1cs(2, 4);
        let (pk, vk) =
            run_ceremony(&r1cs, 5, &["alice", "bob"], &["carol", "dave"], &mut rng).unwrap();

        assert_eq!(pk.circuit_digest(), &r1cs.digest());
        assert_eq!(pk.get_vk(), &vk);
        assert_eq!(vk.n_public, 2);
        assert_eq!(vk.ic.len(), 3);
        assert!(vk.validate().is_ok());
        // 17 constraints and 3 input rows
        assert_eq!(pk.domain_size(), 32);
    }

    #[test]
    fn test_contributions_are_chained() {
        let mut rng = StdRng::seed_from_u64(1);
        let ptau = PowersOfTau::new(3).unwrap();
        let initial = ptau.digest();
        let ptau = ptau.contribute("alice", &mut rng).unwrap();
        let ptau = ptau.contribute("bob", &mut rng).unwrap();

        assert_eq!(ptau.contributions().len(), 2);
        assert_ne!(ptau.contributions()[0].digest, initial);
        assert_eq!(ptau.digest(), ptau.contributions()[1].digest);
        assert!(ptau.verify().is_ok());
    }

    #[test]
    fn test_unsupported_power() {
        assert_eq!(
            PowersOfTau::new(0).unwrap_err(),
            SetupError::UnsupportedPower(0)
        );
        assert_eq!(
            PowersOfTau::new(29).unwrap_err(),
            SetupError::UnsupportedPower(29)
        );
    }

    #[test]
    fn test_empty_contributor_name_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = PowersOfTau::new(2).unwrap().contribute(" ", &mut rng);
        assert!(matches!(
            result,
            Err(SetupError::InvalidContribution { index: 0, .. })
        ));
    }

    #[test]
    fn test_phase2_requires_phase1_contribution() {
        let ptau = PowersOfTau::new(3).unwrap();
        assert_eq!(
            ptau.prepare_phase2().unwrap_err(),
            SetupError::MissingPhase1Contribution("preparing phase 2")
        );
    }

    #[test]
    fn test_keys_require_phase2_contribution() {
        let mut rng = StdRng::seed_from_u64(2);
        let r1cs = r1cs(2, 4);
        let prepared = prepared(5, &["alice"], &mut rng);

        let phase2 = Phase2::initialize(&r1cs, &prepared).unwrap();
        assert_eq!(
            phase2.finalize(&r1cs, &prepared).unwrap_err(),
            SetupError::MissingPhase2Contribution
        );
    }

    #[test]
    fn test_reused_randomness_is_rejected() {
        let ptau = PowersOfTau::new(3)
            .unwrap()
            .contribute("alice", StdRng::seed_from_u64(3))
            .unwrap()
            .contribute("mallory", StdRng::seed_from_u64(3))
            .unwrap();

        assert_eq!(
            ptau.verify().unwrap_err(),
            SetupError::ReusedRandomness {
                index: 1,
                name: "mallory".to_owned(),
                previous: 0,
            }
        );

        let mut rng = StdRng::seed_from_u64(4);
        let r1cs = r1cs(1, 2);
        let prepared = prepared(4, &["alice"], &mut rng);
        let phase2 = Phase2::initialize(&r1cs, &prepared)
            .unwrap()
            .contribute("bob", StdRng::seed_from_u64(5))
            .unwrap()
            .contribute("mallory", StdRng::seed_from_u64(5))
            .unwrap();
        assert!(matches!(
            phase2.verify(&r1cs, &prepared),
            Err(SetupError::ReusedRandomness { index: 1, .. })
        ));
    }

    #[test]
    fn test_dropped_contribution_breaks_transcript() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut ptau = PowersOfTau::new(3).unwrap();
        for name in ["alice", "bob", "carol"] {
            ptau = ptau.contribute(name, &mut rng).unwrap();
        }

        let mut json = serde_json::to_value(&ptau).unwrap();
        json["contributions"].as_array_mut().unwrap().remove(1);
        let tampered: PowersOfTau = serde_json::from_value(json).unwrap();

        assert_eq!(
            tampered.verify().unwrap_err(),
            SetupError::BrokenTranscript {
                phase: "phase 1",
                index: 1,
            }
        );
    }

    #[test]
    fn test_tampered_accumulator_is_rejected() {
        let mut rng = StdRng::seed_from_u64(7);
        let ptau = PowersOfTau::new(3)
            .unwrap()
            .contribute("alice", &mut rng)
            .unwrap();

        let mut json = serde_json::to_value(&ptau).unwrap();
        json["tau_g1"][3] = json["tau_g1"][2].clone();
        let tampered: PowersOfTau = serde_json::from_value(json).unwrap();

        assert!(matches!(
            tampered.prepare_phase2(),
            Err(SetupError::InvalidContribution { index: 0, .. })
        ));
    }

    #[test]
    fn test_tampered_phase2_query_is_rejected() {
        let mut rng = StdRng::seed_from_u64(8);
        let r1cs = r1cs(1, 2);
        let prepared = prepared(4, &["alice"], &mut rng);
        let phase2 = Phase2::initialize(&r1cs, &prepared)
            .unwrap()
            .contribute("bob", &mut rng)
            .unwrap();

        let mut json = serde_json::to_value(&phase2).unwrap();
        json["l_query"][0] = json["l_query"][1].clone();
        let tampered: Phase2 = serde_json::from_value(json).unwrap();

        assert!(matches!(
            tampered.finalize(&r1cs, &prepared),
            Err(SetupError::InvalidContribution { .. })
        ));
    }

    #[test]
    fn test_circuit_too_large() {
        let mut rng = StdRng::seed_from_u64(9);
        let prepared = prepared(3, &["alice"], &mut rng);

        assert_eq!(
            Phase2::initialize(&r1cs(2, 4), &prepared).unwrap_err(),
            SetupError::CircuitTooLarge {
                needed: 5,
                available: 3,
            }
        );
    }

    #[test]
    fn test_phase2_state_is_bound_to_its_circuit() {
        let mut rng = StdRng::seed_from_u64(10);
        let prepared = prepared(5, &["alice"], &mut rng);
        let phase2 = Phase2::initialize(&r1cs(2, 4), &prepared)
            .unwrap()
            .contribute("bob", &mut rng)
            .unwrap();

        assert!(matches!(
            phase2.verify(&r1cs(3, 4), &prepared),
            Err(SetupError::CircuitMismatch { .. })
        ));

        let other = self::prepared(5, &["carol"], &mut rng);
        assert_eq!(
            phase2.verify(&r1cs(2, 4), &other).unwrap_err(),
            SetupError::Phase1Mismatch
        );
    }
}
