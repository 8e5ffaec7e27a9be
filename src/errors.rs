//! Error types.

use alloc::string::String;

/// Alias for [`core::result::Result`] with the `rsa-keyfile` crate's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Bad DER length octets or a structurally invalid field.
    #[error("malformed encoding")]
    MalformedEncoding,

    /// A DER element carried a different tag than the one expected here.
    #[error("unexpected tag: expected 0x{expected:02x}, got 0x{actual:02x}")]
    UnexpectedTag {
        /// Tag required at this position.
        expected: u8,
        /// Tag found in the input.
        actual: u8,
    },

    /// The buffer ended in the middle of a field.
    #[error("truncated input")]
    TruncatedInput,

    /// OpenSSH-v1 check integers differ.
    #[error("check failed")]
    IntegrityCheckFailed,

    /// No signature backend is registered under this identifier.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The operation needs decrypted private key material.
    #[error("key is encrypted")]
    IsEncrypted,

    /// The record lacks a field this operation needs.
    #[error("missing key field: {0}")]
    MissingField(&'static str),

    /// Prime factors that cannot produce CRT parameters.
    #[error("invalid prime value")]
    InvalidPrime,

    /// Digest info does not fit in the modulus.
    #[error("message too long")]
    MessageTooLong,

    /// Signature did not verify.
    #[error("verification error")]
    Verification,

    /// A pluggable generator or signer failed.
    #[error("backend failure: {0}")]
    BackendFailure(String),
}

impl Error {
    /// Returns `true` for the failures raised while walking a malformed or
    /// short input buffer.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Error::MalformedEncoding | Error::UnexpectedTag { .. } | Error::TruncatedInput
        )
    }
}

impl From<ssh_encoding::Error> for Error {
    fn from(err: ssh_encoding::Error) -> Self {
        match err {
            ssh_encoding::Error::Length | ssh_encoding::Error::Overflow => Error::TruncatedInput,
            _ => Error::MalformedEncoding,
        }
    }
}
