use halo2_proofs::halo2curves::{
    bn256::Fr as Fp,
    ff::{Field, PrimeField},
};

/// Converts value Fp to n bits in little endian order.
/// If value needs fewer than n bits, the returned bits are padded with `false` at the most significant end.
/// Example:
/// decompose_fp_to_bits(0b1101, 6) -> [true, false, true, true, false, false]
/// If value needs more than n bits, the most significant bits are truncated and a warning is logged.
/// The resulting decomposition then cannot satisfy the reconstruction constraint.
pub fn decompose_fp_to_bits(value: Fp, n: usize) -> Vec<bool> {
    let repr = value.to_repr();
    let mut bits: Vec<bool> = repr
        .as_ref()
        .iter()
        .flat_map(|byte| (0..8).map(move |i| (byte >> i) & 1 == 1))
        .collect();

    let significant = bits.iter().rposition(|bit| *bit).map_or(0, |i| i + 1);
    if significant > n {
        log::warn!(
            "`decompose_fp_to_bits` value needs {} bits which is more than {}. Truncating the output to fit the specified length.",
            significant,
            n
        );
    }

    bits.resize(n, false);
    bits
}

/// Returns 2^by as a field element
pub fn pow_of_two(by: usize) -> Fp {
    Fp::from(2).pow_vartime([by as u64])
}
