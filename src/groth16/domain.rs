use halo2_proofs::{
    arithmetic::{best_fft, parallelize, FftGroup},
    halo2curves::{
        bn256::Fr as Fp,
        ff::{Field, PrimeField},
    },
    poly::EvaluationDomain,
};

/// Multiplicative subgroup of size `2^k` over which constraints are interpolated, together with
/// the coset `g·H` used to divide by the vanishing polynomial `Z(X) = X^n - 1`.
#[derive(Clone, Debug)]
pub(crate) struct Radix2Domain {
    log_size: u32,
    omega: Fp,
    omega_inv: Fp,
    size_inv: Fp,
}

impl Radix2Domain {
    /// `None` when the field has no subgroup of that size
    pub fn new(log_size: u32) -> Option<Self> {
        if log_size == 0 || log_size > Fp::S {
            return None;
        }
        let domain = EvaluationDomain::<Fp>::new(1, log_size);
        let size_inv = Fp::from(1u64 << log_size).invert().unwrap(); // n < p
        Some(Radix2Domain {
            log_size,
            omega: domain.get_omega(),
            omega_inv: domain.get_omega_inv(),
            size_inv,
        })
    }

    /// Smallest domain holding `rows` evaluation points
    pub fn for_rows(rows: usize) -> Option<Self> {
        let log_size = rows.max(2).next_power_of_two().trailing_zeros();
        Self::new(log_size)
    }

    pub fn size(&self) -> usize {
        1 << self.log_size
    }

    pub fn log_size(&self) -> u32 {
        self.log_size
    }

    /// Evaluations to coefficients, or `[τ^i]` to `[L_i(τ)]` when applied to group elements
    pub fn ifft<G: FftGroup<Fp>>(&self, values: &mut [G]) {
        best_fft(values, self.omega_inv, self.log_size);
        let size_inv = self.size_inv;
        parallelize(values, move |chunk, _| {
            for value in chunk.iter_mut() {
                *value = *value * size_inv;
            }
        });
    }

    pub fn fft(&self, coeffs: &mut [Fp]) {
        best_fft(coeffs, self.omega, self.log_size);
    }

    /// Coefficients to evaluations over `g·H`
    pub fn coset_fft(&self, coeffs: &mut [Fp]) {
        distribute_powers(coeffs, Fp::MULTIPLICATIVE_GENERATOR);
        self.fft(coeffs);
    }

    /// Evaluations over `g·H` to coefficients
    pub fn coset_ifft(&self, evals: &mut [Fp]) {
        self.ifft(evals);
        distribute_powers(evals, Fp::MULTIPLICATIVE_GENERATOR.invert().unwrap());
    }

    /// `1 / Z(g·ω^i)`, the same for every point of the coset: `Z(g·ω^i) = g^n - 1`
    pub fn vanishing_on_coset_inv(&self) -> Fp {
        let z = Fp::MULTIPLICATIVE_GENERATOR.pow_vartime([self.size() as u64]) - Fp::ONE;
        z.invert().unwrap() // the generator has order p - 1, so g^n != 1
    }
}

/// `values[i] *= g^i`
fn distribute_powers(values: &mut [Fp], g: Fp) {
    parallelize(values, |chunk, start| {
        let mut cur = g.pow_vartime([start as u64]);
        for value in chunk.iter_mut() {
            *value *= cur;
            cur *= g;
        }
    });
}
