//! Pluggable key generation.

use alloc::vec::Vec;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::keys::{PrivateKeyParts, PublicKeyParts};
use crate::errors::Result;

/// Produces fresh RSA key material.
///
/// Implementations return every numeric field directly; nothing is derived
/// afterwards.
pub trait KeyGenerator: Send {
    /// Generate a key whose modulus has `bit_size` bits.
    fn generate(&mut self, bit_size: usize) -> Result<GeneratedKey>;
}

/// Raw field bytes returned by a [`KeyGenerator`].
#[derive(Clone, Default, PartialEq, Eq)]
pub struct GeneratedKey {
    /// Modulus
    pub n: Vec<u8>,
    /// Public exponent
    pub e: Vec<u8>,
    /// Private exponent
    pub d: Vec<u8>,
    /// First prime factor
    pub p: Vec<u8>,
    /// Second prime factor
    pub q: Vec<u8>,
    /// D mod (P-1)
    pub dp: Vec<u8>,
    /// D mod (Q-1)
    pub dq: Vec<u8>,
    /// Q^-1 mod P
    pub qinv: Vec<u8>,
}

impl core::fmt::Debug for GeneratedKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GeneratedKey")
            .field("n", &self.n)
            .field("e", &self.e)
            .finish_non_exhaustive()
    }
}

impl Zeroize for GeneratedKey {
    fn zeroize(&mut self) {
        self.d.zeroize();
        self.p.zeroize();
        self.q.zeroize();
        self.dp.zeroize();
        self.dq.zeroize();
        self.qinv.zeroize();
    }
}

impl Drop for GeneratedKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ZeroizeOnDrop for GeneratedKey {}

impl PublicKeyParts for GeneratedKey {
    fn n(&self) -> Option<&[u8]> {
        Some(&self.n)
    }

    fn e(&self) -> Option<&[u8]> {
        Some(&self.e)
    }
}

impl PrivateKeyParts for GeneratedKey {
    fn d(&self) -> Option<&[u8]> {
        Some(&self.d)
    }

    fn p(&self) -> Option<&[u8]> {
        Some(&self.p)
    }

    fn q(&self) -> Option<&[u8]> {
        Some(&self.q)
    }

    fn dp(&self) -> Option<&[u8]> {
        Some(&self.dp)
    }

    fn dq(&self) -> Option<&[u8]> {
        Some(&self.dq)
    }

    fn qinv(&self) -> Option<&[u8]> {
        Some(&self.qinv)
    }
}
