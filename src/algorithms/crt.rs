//! Chinese Remainder Theorem parameters of a two-prime key.

use alloc::vec::Vec;
use num_bigint::{BigInt, IntoBigUint, ModInverse};
use num_integer::Integer;
use num_traits::{One, Signed};
use zeroize::Zeroizing;

use super::pad::{int_from_field, int_to_field};
use crate::errors::{Error, Result};
use crate::traits::PrivateKeyParts;

/// `d mod (prime - 1)`, always in `[0, prime - 1)`.
pub(crate) fn crt_exponent(d: &BigInt, prime: &BigInt) -> Result<BigInt> {
    if prime <= &BigInt::one() {
        return Err(Error::InvalidPrime);
    }
    let order = Zeroizing::new(prime - BigInt::one());
    Ok(d.mod_floor(&order))
}

/// `q^-1 mod p`, the unique value in `[0, p)` with `q * qinv ≡ 1 (mod p)`.
pub(crate) fn crt_coefficient(p: &BigInt, q: &BigInt) -> Result<BigInt> {
    if p <= &BigInt::one() || !q.is_positive() {
        return Err(Error::InvalidPrime);
    }
    let p_uint = Zeroizing::new(p.clone().into_biguint().ok_or(Error::InvalidPrime)?);
    let q_uint = q.clone().into_biguint().ok_or(Error::InvalidPrime)?;

    let qinv = q_uint.mod_inverse(&*p_uint).ok_or(Error::InvalidPrime)?;
    Ok(qinv.mod_floor(p))
}

/// Derived CRT fields for a record: `(dp, dq, qinv)`.
///
/// Only the fields that are absent from `key` and whose inputs are present
/// are computed; everything else is returned as `None`.
pub(crate) fn derive_missing<K: PrivateKeyParts + ?Sized>(key: &K) -> Result<CrtFields> {
    let mut out = CrtFields::default();

    let (d, p, q) = (key.d(), key.p(), key.q());

    if let (Some(d), Some(p)) = (d, p) {
        if key.dp().is_none() {
            let d = Zeroizing::new(int_from_field(d));
            let p = Zeroizing::new(int_from_field(p));
            let dp = Zeroizing::new(crt_exponent(&d, &p)?);
            out.dp = Some(int_to_field(&dp));
        }
    }

    if let (Some(d), Some(q)) = (d, q) {
        if key.dq().is_none() {
            let d = Zeroizing::new(int_from_field(d));
            let q = Zeroizing::new(int_from_field(q));
            let dq = Zeroizing::new(crt_exponent(&d, &q)?);
            out.dq = Some(int_to_field(&dq));
        }
    }

    // qinv only depends on the primes
    if let (Some(p), Some(q)) = (p, q) {
        if key.qinv().is_none() {
            let p = Zeroizing::new(int_from_field(p));
            let q = Zeroizing::new(int_from_field(q));
            let qinv = Zeroizing::new(crt_coefficient(&p, &q)?);
            out.qinv = Some(int_to_field(&qinv));
        }
    }

    Ok(out)
}

/// Output of [`derive_missing`].
#[derive(Default)]
pub(crate) struct CrtFields {
    pub(crate) dp: Option<Vec<u8>>,
    pub(crate) dq: Option<Vec<u8>>,
    pub(crate) qinv: Option<Vec<u8>>,
}

impl zeroize::Zeroize for CrtFields {
    fn zeroize(&mut self) {
        self.dp.zeroize();
        self.dq.zeroize();
        self.qinv.zeroize();
    }
}

impl Drop for CrtFields {
    fn drop(&mut self) {
        zeroize::Zeroize::zeroize(self);
    }
}
