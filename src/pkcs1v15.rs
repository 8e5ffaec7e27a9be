//! PKCS#1 v1.5 signatures as described in [RFC8017 § 8.2], the backend
//! behind the `ssh-rsa` and `rsa-sha2-*` algorithms.
//!
//! [RFC8017 § 8.2]: https://datatracker.ietf.org/doc/html/rfc8017#section-8.2

use alloc::{string::ToString, vec::Vec};
use const_oid::AssociatedOid;
use core::fmt;
use digest::Digest;
use num_bigint::BigUint;
use zeroize::{Zeroize, Zeroizing};

use crate::algorithms::pad::{uint_from_field, uint_to_be_pad, uint_to_zeroizing_be_pad};
use crate::algorithms::pkcs1v15::*;
use crate::algorithms::rsa::{rsa_decrypt, rsa_encrypt};
use crate::encoding::ssh::decode_signature_blob;
use crate::errors::{Error, Result};
use crate::traits::SignatureBackend;

enum BackendKey {
    Private { d: BigUint, n: BigUint },
    Public { e: BigUint, n: BigUint },
}

impl Drop for BackendKey {
    fn drop(&mut self) {
        if let BackendKey::Private { d, .. } = self {
            d.zeroize();
        }
    }
}

/// Deterministic PKCS#1 v1.5 signer/verifier over the digest `D`.
///
/// The private operation is a plain `m^d mod n`; only the private exponent
/// and modulus are needed.
pub struct Pkcs1v15Backend<D>
where
    D: Digest,
{
    algorithm: &'static str,
    hasher: D,
    prefix: Vec<u8>,
    key: Option<BackendKey>,
}

impl<D> fmt::Debug for Pkcs1v15Backend<D>
where
    D: Digest,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pkcs1v15Backend")
            .field("algorithm", &self.algorithm)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl<D> Pkcs1v15Backend<D>
where
    D: Digest + AssociatedOid,
{
    /// Create an unkeyed backend. `algorithm` is the identifier a wrapped
    /// signature must carry to be accepted by [`verify`](SignatureBackend::verify).
    pub fn new(algorithm: &'static str) -> Self {
        Self {
            algorithm,
            hasher: D::new(),
            prefix: pkcs1v15_generate_prefix::<D>(),
            key: None,
        }
    }
}

fn field(bytes: &[u8], name: &str) -> Result<BigUint> {
    uint_from_field(bytes).ok_or_else(|| Error::BackendFailure(name.to_string() + " is negative"))
}

fn size(n: &BigUint) -> usize {
    (n.bits() + 7) / 8
}

impl<D> SignatureBackend for Pkcs1v15Backend<D>
where
    D: Digest + Send,
{
    fn set_private_key(&mut self, d: &[u8], n: &[u8]) -> Result<()> {
        let d = field(d, "private exponent")?;
        let n = field(n, "modulus")?;
        self.key = Some(BackendKey::Private { d, n });
        Ok(())
    }

    fn set_public_key(&mut self, e: &[u8], n: &[u8]) -> Result<()> {
        let e = field(e, "public exponent")?;
        let n = field(n, "modulus")?;
        self.key = Some(BackendKey::Public { e, n });
        Ok(())
    }

    fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.hasher, data);
    }

    fn sign(&mut self) -> Result<Vec<u8>> {
        let (d, n) = match &self.key {
            Some(BackendKey::Private { d, n }) => (d, n),
            _ => return Err(Error::BackendFailure("no private key set".to_string())),
        };
        let hashed = core::mem::replace(&mut self.hasher, D::new()).finalize();
        let k = size(n);

        let em = Zeroizing::new(pkcs1v15_sign_pad(&self.prefix, &hashed, k)?);
        let em = BigUint::from_bytes_be(&em);
        uint_to_zeroizing_be_pad(rsa_decrypt(d, n, &em)?, k)
    }

    fn verify(&mut self, signature: &[u8]) -> Result<bool> {
        let (e, n) = match &self.key {
            Some(BackendKey::Public { e, n }) => (e, n),
            _ => return Err(Error::BackendFailure("no public key set".to_string())),
        };
        let hashed = core::mem::replace(&mut self.hasher, D::new()).finalize();
        let k = size(n);

        let wrapped = decode_signature_blob(signature)
            .filter(|(algorithm, _)| algorithm == self.algorithm.as_bytes());
        let signature = wrapped.as_ref().map_or(signature, |(_, inner)| inner.as_slice());
        if signature.len() != k {
            return Ok(false);
        }

        let s = BigUint::from_bytes_be(signature);
        let result = rsa_encrypt(e, n, &s)
            .and_then(|em| uint_to_be_pad(em, k))
            .and_then(|em| pkcs1v15_sign_unpad(&self.prefix, &hashed, &em, k));

        match result {
            Ok(()) => Ok(true),
            Err(Error::Verification) => Ok(false),
            Err(err) => Err(err),
        }
    }
}
