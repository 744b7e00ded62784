use halo2_proofs::halo2curves::{
    bn256::Fr as Fp,
    ff::{Field, PrimeField},
};
use num_bigint::{BigInt, BigUint, Sign};

// modulus from bn256 curve impl => https://github.com/privacy-scaling-explorations/halo2curves/blob/main/src/bn256/fr.rs#L38
pub const MODULUS_STR: &str = "30644e72e131a029b85045b68181585d2833e84879b9709143e1f593f0000001";

/// The scalar field modulus as a BigUint
pub fn modulus() -> BigUint {
    // The constant above is a valid hex literal
    BigUint::parse_bytes(MODULUS_STR.as_bytes(), 16).unwrap_or_default()
}

/// Converts a BigUint to a Field Element, reducing it modulo the field prime
pub fn big_uint_to_fp(big_uint: &BigUint) -> Fp {
    let mut repr = <Fp as PrimeField>::Repr::default();
    let reduced = (big_uint % modulus()).to_bytes_le();
    repr.as_mut()[..reduced.len()].copy_from_slice(&reduced);
    Option::from(Fp::from_repr(repr)).unwrap_or(Fp::ZERO)
}

/// Converts a Field element to a BigUint
pub fn fp_to_big_uint(f: &Fp) -> BigUint {
    BigUint::from_bytes_le(f.to_repr().as_ref())
}

/// Converts a signed integer to a field element only if it is non-negative and below the modulus.
/// Negative values are not wrapped around.
pub fn big_int_to_canonical_fp(big_int: &BigInt) -> Option<Fp> {
    match big_int.to_biguint() {
        Some(value) if value < modulus() => Some(big_uint_to_fp(&value)),
        _ => None,
    }
}

/// Parses a decimal string into a field element, rejecting anything that is not the canonical
/// representative of a field element (negative numbers, values at or above the modulus, garbage).
pub fn decimal_to_fp(decimal: &str) -> Option<Fp> {
    let value = BigUint::parse_bytes(decimal.trim().as_bytes(), 10)?;
    if value >= modulus() {
        return None;
    }
    Some(big_uint_to_fp(&value))
}

/// Renders a field element as a decimal string
pub fn fp_to_decimal(f: &Fp) -> String {
    fp_to_big_uint(f).to_str_radix(10)
}

/// Returns a BigInt holding 2^bits
pub fn pow_of_two(bits: usize) -> BigInt {
    BigInt::from_biguint(Sign::Plus, BigUint::from(1u8) << bits)
}
