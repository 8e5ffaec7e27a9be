//! Generate prime components for the RSA Private Key

use num_bigint::{BigInt, BigUint, IntoBigUint, ModInverse, RandPrime, Sign};
use num_traits::One;
use rand_core::CryptoRngCore;
use zeroize::Zeroizing;

use super::crt::{crt_coefficient, crt_exponent};
use super::pad::{int_to_field, uint_to_field};
use crate::errors::{Error, Result};
use crate::traits::{GeneratedKey, KeyGenerator};

/// Public exponent used for generated keys.
pub const EXP: u32 = 65537;

/// Smallest modulus size accepted by [`generate_two_prime_key`].
pub const MIN_KEY_SIZE: usize = 64;

/// The raw output of a two-prime key generation run.
pub(crate) struct Components {
    pub n: BigUint,
    pub e: BigUint,
    pub d: BigUint,
    pub p: BigUint,
    pub q: BigUint,
}

impl Drop for Components {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.d.zeroize();
        self.p.zeroize();
        self.q.zeroize();
    }
}

/// Generates a two-prime RSA key of exactly `bit_size` modulus bits with
/// public exponent [`EXP`].
pub(crate) fn generate_two_prime_key<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    bit_size: usize,
) -> Result<Components> {
    if bit_size < MIN_KEY_SIZE {
        return Err(Error::BackendFailure(format!(
            "key size {} is below the minimum of {} bits",
            bit_size, MIN_KEY_SIZE
        )));
    }

    let exp = BigUint::from(EXP);

    loop {
        // `gen_prime` sets the top two bits of each prime, so the product
        // nearly always has exactly `bit_size` bits.
        let p = rng.gen_prime(bit_size / 2);
        let q = rng.gen_prime(bit_size - bit_size / 2);

        if p == q {
            continue;
        }

        let n = &p * &q;
        if n.bits() != bit_size {
            continue;
        }

        let totient = Zeroizing::new((&p - BigUint::one()) * (&q - BigUint::one()));
        if let Some(d) = exp.clone().mod_inverse(&*totient).and_then(|d| d.into_biguint()) {
            return Ok(Components {
                n,
                e: exp,
                d,
                p,
                q,
            });
        }
    }
}

/// [`KeyGenerator`] backed by `num-bigint-dig`'s probabilistic prime search.
///
/// The CRT parameters are computed here, so keys produced this way never go
/// through lazy derivation.
#[derive(Debug)]
pub struct PrimeGenerator<R> {
    rng: R,
}

impl<R: CryptoRngCore> PrimeGenerator<R> {
    /// Create a generator drawing randomness from `rng`.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: CryptoRngCore + Send> KeyGenerator for PrimeGenerator<R> {
    fn generate(&mut self, bit_size: usize) -> Result<GeneratedKey> {
        let components = generate_two_prime_key(&mut self.rng, bit_size)?;

        let d = Zeroizing::new(BigInt::from_biguint(Sign::Plus, components.d.clone()));
        let p = Zeroizing::new(BigInt::from_biguint(Sign::Plus, components.p.clone()));
        let q = Zeroizing::new(BigInt::from_biguint(Sign::Plus, components.q.clone()));

        let dp = Zeroizing::new(crt_exponent(&d, &p)?);
        let dq = Zeroizing::new(crt_exponent(&d, &q)?);
        let qinv = Zeroizing::new(crt_coefficient(&p, &q)?);

        Ok(GeneratedKey {
            n: uint_to_field(&components.n),
            e: uint_to_field(&components.e),
            d: uint_to_field(&components.d),
            p: uint_to_field(&components.p),
            q: uint_to_field(&components.q),
            dp: int_to_field(&dp),
            dq: int_to_field(&dq),
            qinv: int_to_field(&qinv),
        })
    }
}
