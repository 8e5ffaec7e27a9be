//! Private key container encodings.
//!
//! Every decoder in this module is fail-closed: it either returns a fully
//! populated [`KeyRecord`](crate::KeyRecord) or an [`Error`](crate::Error),
//! never a partial record.

pub mod der;
pub mod ssh;
mod vendor;

pub(crate) use vendor::decode_private;

/// Container layout a private key blob was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyFormat {
    /// `RSAPrivateKey` from PKCS#1, DER encoded.
    Pkcs1Der,
    /// PuTTY `.ppk` version 2 private blob.
    PuttyV2,
    /// PuTTY `.ppk` version 3 private blob.
    PuttyV3,
    /// F-Secure / SSH.com integer list.
    FSecure,
    /// Private section of an `openssh-key-v1` container.
    OpenSshV1,
    /// SSH agent `ADD_IDENTITY` key body.
    OpenSshAgent,
}
