//! Traits related to the key components
//!
//! Every component is a big-endian, sign-extended integer byte string.

/// Components of an RSA public key.
pub trait PublicKeyParts {
    /// Returns the modulus of the key.
    fn n(&self) -> Option<&[u8]>;

    /// Returns the public exponent of the key.
    fn e(&self) -> Option<&[u8]>;
}

/// Components of an RSA private key.
pub trait PrivateKeyParts: PublicKeyParts {
    /// Returns the private exponent of the key.
    fn d(&self) -> Option<&[u8]>;

    /// Returns the first prime factor.
    fn p(&self) -> Option<&[u8]>;

    /// Returns the second prime factor.
    fn q(&self) -> Option<&[u8]>;

    /// Returns the CRT exponent, D mod (P-1)
    fn dp(&self) -> Option<&[u8]>;

    /// Returns the CRT exponent, D mod (Q-1)
    fn dq(&self) -> Option<&[u8]>;

    /// Returns the CRT coefficient, Q^-1 mod P
    fn qinv(&self) -> Option<&[u8]>;
}
