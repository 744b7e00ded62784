#[cfg(test)]
mod test {
    use crate::chips::one_hot::OneHotSelectChip;
    use crate::chips::range::range_check::RangeCheckChip;
    use crate::errors::SynthesisError;
    use crate::r1cs::{Circuit, ConstraintSystem, MockProver, Variable, VerifyFailure};
    use halo2_proofs::halo2curves::{bn256::Fr as Fp, ff::Field};

    const N_BITS: usize = 8;

    struct RangeTestCircuit {
        value: Option<Fp>,
    }

    impl Circuit for RangeTestCircuit {
        fn synthesize<CS: ConstraintSystem>(&self, cs: &mut CS) -> Result<(), SynthesisError> {
            let value = cs.alloc_private(
                || "value".to_owned(),
                || self.value.ok_or(SynthesisError::AssignmentMissing),
            )?;
            RangeCheckChip::construct(N_BITS).assign(cs, "value", value, self.value)?;
            Ok(())
        }
    }

    struct SelectTestCircuit {
        values: Option<Vec<Fp>>,
        index: Option<usize>,
        n: usize,
    }

    impl Circuit for SelectTestCircuit {
        fn synthesize<CS: ConstraintSystem>(&self, cs: &mut CS) -> Result<(), SynthesisError> {
            let values = (0..self.n)
                .map(|i| {
                    cs.alloc_private(
                        || format!("value {}", i),
                        || {
                            self.values
                                .as_ref()
                                .map(|values| values[i])
                                .ok_or(SynthesisError::AssignmentMissing)
                        },
                    )
                })
                .collect::<Result<Vec<_>, _>>()?;

            let selected = OneHotSelectChip::construct().assign(
                cs,
                &values,
                self.values.as_deref(),
                self.index,
            )?;

            let expected = cs.alloc_public(
                || "expected".to_owned(),
                || {
                    self.values
                        .as_ref()
                        .zip(self.index)
                        .map(|(values, index)| values[index])
                        .ok_or(SynthesisError::AssignmentMissing)
                },
            )?;
            cs.enforce(
                || "selected value is the expected one".to_owned(),
                selected,
                Variable::One.into(),
                expected.into(),
            );
            Ok(())
        }
    }

    #[test]
    fn test_range_check_accepts_values_in_range() {
        for value in [0u64, 1, 5, 255] {
            let circuit = RangeTestCircuit {
                value: Some(Fp::from(value)),
            };
            MockProver::run(&circuit).unwrap().assert_satisfied();
        }
    }

    #[test]
    fn test_range_check_shape() {
        let prover = MockProver::run(&RangeTestCircuit {
            value: Some(Fp::from(3)),
        })
        .unwrap();
        let info = prover.r1cs().info();
        assert_eq!(info.constraints, N_BITS + 1);
        assert_eq!(info.private_inputs, N_BITS + 1);
        assert_eq!(info.public_inputs, 0);
    }

    // 2^8 does not fit in 8 bits: the truncated decomposition cannot rebuild the value
    #[test]
    fn test_range_check_rejects_overflow() {
        let circuit = RangeTestCircuit {
            value: Some(Fp::from(256)),
        };
        let prover = MockProver::run(&circuit).unwrap();
        assert_eq!(
            prover.verify(),
            Err(vec![VerifyFailure {
                index: N_BITS,
                annotation: "value equals its 8-bit decomposition".to_owned(),
            }])
        );
    }

    // -5 is p - 5 in the field, a huge number that no 8-bit decomposition reaches
    #[test]
    fn test_range_check_rejects_wrapped_negative() {
        let circuit = RangeTestCircuit {
            value: Some(-Fp::from(5)),
        };
        let prover = MockProver::run(&circuit).unwrap();
        assert_eq!(
            prover.verify(),
            Err(vec![VerifyFailure {
                index: N_BITS,
                annotation: "value equals its 8-bit decomposition".to_owned(),
            }])
        );
    }

    // A malicious prover keeps the weighted sum right with non-boolean "bits": 3 - 2 + 4 = 5
    #[test]
    fn test_range_check_rejects_non_boolean_bits() {
        let circuit = RangeTestCircuit {
            value: Some(Fp::from(5)),
        };
        let mut prover = MockProver::run(&circuit).unwrap();
        prover.set_value(Variable::Private(1), Fp::from(3));
        prover.set_value(Variable::Private(2), -Fp::ONE);

        assert_eq!(
            prover.verify(),
            Err(vec![
                VerifyFailure {
                    index: 0,
                    annotation: "value bit 0 is boolean".to_owned(),
                },
                VerifyFailure {
                    index: 1,
                    annotation: "value bit 1 is boolean".to_owned(),
                },
            ])
        );
    }

    #[test]
    fn test_one_hot_selects_private_position() {
        let values = vec![Fp::from(4), Fp::from(7), Fp::from(9)];
        for index in 0..values.len() {
            let circuit = SelectTestCircuit {
                values: Some(values.clone()),
                index: Some(index),
                n: values.len(),
            };
            let prover = MockProver::run(&circuit).unwrap();
            prover.assert_satisfied();
            assert_eq!(prover.value(Variable::Public(0)), values[index]);
        }
    }

    // Setting two indicators would let the prover claim 4 + 7 = 11 as a single balance
    #[test]
    fn test_one_hot_rejects_two_indicators() {
        let circuit = SelectTestCircuit {
            values: Some(vec![Fp::from(4), Fp::from(7), Fp::from(9)]),
            index: Some(1),
            n: 3,
        };
        let mut prover = MockProver::run(&circuit).unwrap();
        prover.set_value(Variable::Private(3), Fp::ONE);
        prover.set_value(Variable::Private(6), Fp::from(4));
        prover.set_value(Variable::Public(0), Fp::from(11));

        assert_eq!(
            prover.verify(),
            Err(vec![VerifyFailure {
                index: 3,
                annotation: "exactly one indicator is set".to_owned(),
            }])
        );
    }

    // Without an indicator set the selected sum is zero and cannot match a non-zero expectation
    #[test]
    fn test_one_hot_rejects_no_indicator() {
        let circuit = SelectTestCircuit {
            values: Some(vec![Fp::from(4), Fp::from(7), Fp::from(9)]),
            index: Some(2),
            n: 3,
        };
        let mut prover = MockProver::run(&circuit).unwrap();
        prover.set_value(Variable::Private(5), Fp::ZERO);
        prover.set_value(Variable::Private(8), Fp::ZERO);

        let failures = prover.verify().unwrap_err();
        let indices: Vec<usize> = failures.iter().map(|failure| failure.index).collect();
        assert_eq!(indices, vec![3, 7]);
    }
}
