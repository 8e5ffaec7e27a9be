//! Pluggable signature algorithms.

use alloc::vec::Vec;

use crate::errors::Result;

/// A signer/verifier for one signature algorithm.
///
/// A fresh backend is built for every operation. It is keyed with either the
/// private exponent or the public exponent, fed the message with
/// [`update`](Self::update), and then asked to [`sign`](Self::sign) or
/// [`verify`](Self::verify).
pub trait SignatureBackend: Send {
    /// Key the backend for signing with the private exponent `d` and modulus `n`.
    fn set_private_key(&mut self, d: &[u8], n: &[u8]) -> Result<()>;

    /// Key the backend for verification with the public exponent `e` and modulus `n`.
    fn set_public_key(&mut self, e: &[u8], n: &[u8]) -> Result<()>;

    /// Append message bytes.
    fn update(&mut self, data: &[u8]);

    /// Sign everything passed to [`update`](Self::update) so far.
    fn sign(&mut self) -> Result<Vec<u8>>;

    /// Check `signature` against everything passed to [`update`](Self::update).
    fn verify(&mut self, signature: &[u8]) -> Result<bool>;
}
