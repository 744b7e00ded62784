#[cfg(test)]
mod test {

    use crate::circuits::proof_of_reserves::{CircuitParams, ProofOfReservesCircuit};
    use crate::circuits::utils::{full_prover, full_verifier, generate_setup_artifacts};
    use crate::circuits::witness::{generate_witness, ProofRequest};
    use crate::circuits::WithInstances;
    use crate::errors::{Mismatch, ProverError, VerifierError, WitnessError};
    use crate::groth16::{verify_artifact, ProofArtifact, ProofMetadata, PROOF_SIZE};
    use crate::r1cs::{MockProver, Variable};
    use crate::utils::{fp_to_decimal, generate_dummy_balances, parse_csv_to_entries};
    use halo2_proofs::halo2curves::bn256::Fr as Fp;
    use num_bigint::BigInt;

    const N_USERS: usize = 5;
    const BALANCE_BITS: usize = 8;
    // 5 · (8 + 3) + 3 constraints and 3 input rows fit in 2^6
    const POWER: u32 = 6;

    fn params() -> CircuitParams {
        CircuitParams::new(N_USERS, BALANCE_BITS)
    }

    fn request(balances: &[i64], index: usize, claimed_total: i64, expected: i64) -> ProofRequest {
        ProofRequest::new(
            balances.iter().map(|balance| BigInt::from(*balance)).collect(),
            index,
            BigInt::from(claimed_total),
            BigInt::from(expected),
        )
    }

    #[test]
    fn test_valid_proof_of_reserves() {
        for index in 0..N_USERS {
            let balances = [3, 5, 0, 10, 2];
            let circuit = ProofOfReservesCircuit::init(
                params(),
                &request(&balances, index, 20, balances[index]),
            )
            .unwrap();

            let prover = MockProver::run(&circuit).unwrap();
            prover.assert_satisfied();
            assert_eq!(
                prover.r1cs().constraints().len(),
                params().num_constraints()
            );
            assert_eq!(prover.value(Variable::Public(0)), Fp::from(20));
        }
    }

    #[test]
    fn test_invalid_claimed_total() {
        let circuit =
            ProofOfReservesCircuit::init(params(), &request(&[3, 5, 0, 10, 2], 3, 20, 10)).unwrap();
        let mut prover = MockProver::run(&circuit).unwrap();

        prover.set_value(Variable::Public(0), Fp::from(21));
        let failures = prover.verify().unwrap_err();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].index, N_USERS * (BALANCE_BITS + 1));
        assert_eq!(failures[0].annotation, "balances sum to the claimed total");
    }

    #[test]
    fn test_invalid_expected_balance() {
        let circuit =
            ProofOfReservesCircuit::init(params(), &request(&[3, 5, 0, 10, 2], 3, 20, 10)).unwrap();
        let mut prover = MockProver::run(&circuit).unwrap();

        prover.set_value(Variable::Public(1), Fp::from(9));
        let failures = prover.verify().unwrap_err();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].index, params().num_constraints() - 1);
        assert_eq!(
            failures[0].annotation,
            "selected balance equals the expected balance"
        );
    }

    #[test]
    fn test_negative_balance_wire_is_rejected() {
        // a field element standing for -3 can only be reached by tampering with the witness
        let circuit =
            ProofOfReservesCircuit::init(params(), &request(&[3, 5, 0, 10, 2], 3, 20, 10)).unwrap();
        let mut prover = MockProver::run(&circuit).unwrap();

        prover.set_value(Variable::Private(2), -Fp::from(3));
        prover.set_value(Variable::Public(0), Fp::from(17));
        let failures = prover.verify().unwrap_err();
        assert!(failures
            .iter()
            .all(|failure| failure.annotation.starts_with("balance 2")));
    }

    #[test]
    fn test_witness_generation_errors() {
        assert_eq!(
            generate_witness(&params(), &request(&[3, 5, 0, 10, 2], 3, 21, 10)).unwrap_err(),
            WitnessError::InputMismatch(Mismatch::ClaimedTotal {
                claimed: BigInt::from(21),
                actual: BigInt::from(20)
            })
        );
        assert_eq!(
            generate_witness(&params(), &request(&[3, 5, 0, 10, 2], 3, 20, 9)).unwrap_err(),
            WitnessError::InputMismatch(Mismatch::ExpectedBalance {
                expected: BigInt::from(9),
                actual: BigInt::from(10)
            })
        );
        assert!(matches!(
            generate_witness(&params(), &request(&[3, 5, -1, 10, 2], 3, 19, 10)),
            Err(WitnessError::BalanceOutOfRange { position: 2, .. })
        ));
    }

    #[test]
    fn test_valid_proof_of_reserves_with_full_prover() {
        // keys are derived from an empty circuit: only the dimensions matter
        let empty = ProofOfReservesCircuit::init_empty(params()).unwrap();
        let (r1cs, pk, vk) = generate_setup_artifacts(POWER, None, &empty).unwrap();

        let entries = parse_csv_to_entries("data/entry_5.csv").unwrap();
        let request = ProofRequest::from_entries(&entries, 3, BigInt::from(20)).unwrap();
        let circuit = ProofOfReservesCircuit::init(params(), &request).unwrap();
        let witness = generate_witness(&params(), &request).unwrap();
        assert_eq!(witness.public_inputs(), circuit.instances().as_slice());

        let proof = full_prover(&pk, &r1cs, &witness).unwrap();
        assert!(full_verifier(&vk, &proof, &[Fp::from(20), Fp::from(10)]).unwrap());

        // the same proof does not hold for another claimed total or another expected balance
        assert!(!full_verifier(&vk, &proof, &[Fp::from(21), Fp::from(10)]).unwrap());
        assert!(!full_verifier(&vk, &proof, &[Fp::from(20), Fp::from(9)]).unwrap());

        let mut artifact = ProofArtifact {
            proof,
            public_signals: vec![fp_to_decimal(&Fp::from(20)), fp_to_decimal(&Fp::from(10))],
            metadata: ProofMetadata {
                timestamp: "2024-01-01T00:00:00Z".to_owned(),
                claimed_total: "20".to_owned(),
                public_wallet_address: "bc1qxy2kgdygjrsqtzq2n0yrf2493p83kkfjhx0wlh".to_owned(),
                description: "Proof that exchange reserves match liabilities".to_owned(),
            },
        };
        assert!(verify_artifact(&vk, &artifact).unwrap());

        // metadata that disagrees with the proven total is rejected before the pairing check
        let mut inflated = artifact.clone();
        inflated.metadata.claimed_total = "1000000".to_owned();
        assert_eq!(
            verify_artifact(&vk, &inflated),
            Err(VerifierError::ClaimedTotalMismatch {
                metadata: "1000000".to_owned(),
                signal: "20".to_owned(),
            })
        );

        artifact.public_signals[0] = "21".to_owned();
        artifact.metadata.claimed_total = "21".to_owned();
        assert!(!verify_artifact(&vk, &artifact).unwrap());
    }

    #[test]
    fn test_proof_size_is_constant() {
        let empty = ProofOfReservesCircuit::init_empty(params()).unwrap();
        let (r1cs, pk, vk) = generate_setup_artifacts(POWER, None, &empty).unwrap();

        let small = request(&[3, 5, 0, 10, 2], 2, 20, 0);
        let large = request(&[255, 254, 200, 1, 128], 0, 838, 255);
        for request in [small, large] {
            let witness = generate_witness(&params(), &request).unwrap();
            let proof = full_prover(&pk, &r1cs, &witness).unwrap();
            assert_eq!(proof.to_bytes().len(), PROOF_SIZE);
            assert!(full_verifier(&vk, &proof, witness.public_inputs()).unwrap());
        }
    }

    #[test]
    fn test_ledgers_with_same_public_signals_give_same_shape_proofs() {
        let empty = ProofOfReservesCircuit::init_empty(params()).unwrap();
        let (r1cs, pk, vk) = generate_setup_artifacts(POWER, None, &empty).unwrap();

        // only the balances of users other than the proven one differ
        let first = generate_witness(&params(), &request(&[3, 5, 0, 10, 2], 3, 20, 10)).unwrap();
        let second = generate_witness(&params(), &request(&[4, 4, 0, 10, 2], 3, 20, 10)).unwrap();
        assert_eq!(first.public_inputs(), second.public_inputs());

        let signals = [Fp::from(20), Fp::from(10)];
        let proofs: Vec<_> = [first, second]
            .iter()
            .map(|witness| full_prover(&pk, &r1cs, witness).unwrap())
            .collect();
        for proof in &proofs {
            assert_eq!(proof.to_bytes().len(), PROOF_SIZE);
            assert!(full_verifier(&vk, proof, &signals).unwrap());
        }
        assert_ne!(proofs[0], proofs[1]);
    }

    #[test]
    fn test_key_of_other_user_count_is_rejected() {
        let other = CircuitParams::new(4, BALANCE_BITS);
        let (_, pk, _) = generate_setup_artifacts(
            POWER,
            None,
            &ProofOfReservesCircuit::init_empty(other).unwrap(),
        )
        .unwrap();

        let circuit = ProofOfReservesCircuit::init_empty(params()).unwrap();
        let r1cs = crate::r1cs::R1cs::from_circuit(&circuit).unwrap();
        let witness = generate_witness(&params(), &request(&[3, 5, 0, 10, 2], 3, 20, 10)).unwrap();

        assert!(matches!(
            full_prover(&pk, &r1cs, &witness),
            Err(ProverError::KeyMismatch { .. })
        ));
    }

    #[test]
    fn test_dummy_ledger_proof() {
        let params = CircuitParams::new(4, 17);
        let entries = generate_dummy_balances(4);
        let total: BigInt = entries.iter().map(|entry| entry.balance().clone()).sum();
        let request = ProofRequest::from_entries(&entries, 1, total).unwrap();

        let circuit = ProofOfReservesCircuit::init(params, &request).unwrap();
        MockProver::run(&circuit).unwrap().assert_satisfied();
    }
}
