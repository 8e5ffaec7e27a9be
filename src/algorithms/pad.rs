//! Special handling for converting between key field byte strings and integers.
//!
//! Key fields are carried the way SSH and DER carry them: big-endian,
//! sign-extended, minimal two's-complement byte strings.

use alloc::vec::Vec;
use num_bigint::{BigInt, BigUint, IntoBigUint, Sign};
use zeroize::Zeroizing;

use crate::errors::{Error, Result};

/// Parses a two's-complement big-endian field. An empty slice is zero.
#[inline]
pub(crate) fn int_from_field(field: &[u8]) -> BigInt {
    BigInt::from_signed_bytes_be(field)
}

/// Parses a field that must hold a non-negative integer.
#[inline]
pub(crate) fn uint_from_field(field: &[u8]) -> Option<BigUint> {
    int_from_field(field).into_biguint()
}

/// Minimal two's-complement encoding. Zero encodes as a single `0x00`.
#[inline]
pub(crate) fn int_to_field(value: &BigInt) -> Vec<u8> {
    value.to_signed_bytes_be()
}

#[inline]
pub(crate) fn uint_to_field(value: &BigUint) -> Vec<u8> {
    let value = Zeroizing::new(BigInt::from_biguint(Sign::Plus, value.clone()));
    value.to_signed_bytes_be()
}

/// Number of significant bits of the integer held in `field`.
#[inline]
pub(crate) fn bit_length(field: &[u8]) -> usize {
    int_from_field(field).bits()
}

/// Returns a new vector of the given length, with 0s left padded.
#[inline]
fn left_pad(input: &[u8], padded_len: usize) -> Result<Vec<u8>> {
    if input.len() > padded_len {
        return Err(Error::MessageTooLong);
    }

    let mut out = vec![0u8; padded_len];
    out[padded_len - input.len()..].copy_from_slice(input);
    Ok(out)
}

/// Converts input to the new vector of the given length, using BE and with 0s left padded.
#[inline]
pub(crate) fn uint_to_be_pad(input: BigUint, padded_len: usize) -> Result<Vec<u8>> {
    left_pad(&input.to_bytes_be(), padded_len)
}

/// Converts input to the new vector of the given length, using BE and with 0s left padded.
#[inline]
pub(crate) fn uint_to_zeroizing_be_pad(input: BigUint, padded_len: usize) -> Result<Vec<u8>> {
    let m = Zeroizing::new(input);
    let m = Zeroizing::new(m.to_bytes_be());
    left_pad(&m, padded_len)
}
