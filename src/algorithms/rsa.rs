//! Generic RSA implementation

use num_bigint::BigUint;
use num_traits::Zero;

use crate::errors::{Error, Result};

/// Raw RSA public operation `m^e mod n`. No padding is performed.
#[inline]
pub(crate) fn rsa_encrypt(e: &BigUint, n: &BigUint, m: &BigUint) -> Result<BigUint> {
    if n.is_zero() || m >= n {
        return Err(Error::Verification);
    }
    Ok(m.modpow(e, n))
}

/// Raw RSA private operation `c^d mod n` using only the private exponent
/// and modulus. No padding is performed.
#[inline]
pub(crate) fn rsa_decrypt(d: &BigUint, n: &BigUint, c: &BigUint) -> Result<BigUint> {
    if n.is_zero() || c >= n {
        return Err(Error::MessageTooLong);
    }
    Ok(c.modpow(d, n))
}
