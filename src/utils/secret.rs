use halo2_proofs::halo2curves::bn256::Fr as Fp;
use zeroize::DefaultIsZeroes;

/// A field element that must not outlive its use: ceremony toxic waste and private witness values.
/// Wrap it in [`zeroize::Zeroizing`] so it is overwritten on every exit path, unwinding included.
#[derive(Clone, Copy, Default)]
pub struct SecretScalar(pub Fp);

impl DefaultIsZeroes for SecretScalar {}

impl std::fmt::Debug for SecretScalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretScalar(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zeroize::Zeroize;

    #[test]
    fn test_secret_scalar_is_wiped() {
        let mut secrets = vec![SecretScalar(Fp::from(7)), SecretScalar(Fp::from(11))];
        secrets.zeroize();
        assert!(secrets.is_empty());

        let mut secret = SecretScalar(Fp::from(13));
        secret.zeroize();
        assert_eq!(secret.0, Fp::default());
        assert_eq!(format!("{:?}", secret), "SecretScalar(..)");
    }
}
