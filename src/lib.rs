#![cfg_attr(not(test), no_std)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # Supported formats
//!
//! Private key blobs are read from:
//!
//! - PKCS#1 `RSAPrivateKey`, DER encoded ([`KeyFormat::Pkcs1Der`])
//! - PuTTY `.ppk` v2 and v3 private blobs ([`KeyFormat::PuttyV2`], [`KeyFormat::PuttyV3`])
//! - F-Secure / SSH.com integer lists ([`KeyFormat::FSecure`])
//! - the private section of `openssh-key-v1` ([`KeyFormat::OpenSshV1`])
//! - SSH agent key bodies ([`KeyFormat::OpenSshAgent`])
//!
//! and written back as PKCS#1 DER, SSH agent key bodies and `openssh-key-v1`
//! key fields. Base64/PEM framing and passphrase ciphers are left to the
//! caller.
//!
//! # Usage
//!
//! ## Converting a PuTTY key to PKCS#1
//!
//! PuTTY keeps the public half of a key outside of the private blob, so the
//! key pair is created from the public key blob first.
//!
//! ```
//! use std::sync::Arc;
//! use rsa_keyfile::{KeyFormat, Registry, RsaKeyPair};
//! use rsa_keyfile::encoding::ssh::encode_public_key_blob;
//!
//! let registry = Arc::new(Registry::default());
//!
//! // textbook key: p = 61, q = 53, e = 17, d = 2753
//! let public = encode_public_key_blob(&[0x11], &[0x0c, 0xa1])?;
//! let private: [u8; 21] = [
//!     0, 0, 0, 2, 0x0a, 0xc1, // d
//!     0, 0, 0, 1, 0x3d,       // p
//!     0, 0, 0, 1, 0x35,       // q
//!     0, 0, 0, 1, 0x26,       // qinv
//! ];
//!
//! let mut pair = RsaKeyPair::from_public_key_blob(registry, &public)?;
//! pair.decode(KeyFormat::PuttyV2, &private)?;
//! assert_eq!(pair.key_size(), 12);
//!
//! // dp and dq were derived
//! let der = pair.to_pkcs1_der()?;
//! assert_eq!(&der[..2], &[0x30u8, 0x1d]);
//! # Ok::<(), rsa_keyfile::Error>(())
//! ```
//!
//! ## Signatures
//!
//! Signature algorithms are looked up by their SSH identifier in the
//! [`Registry`] the key pair was created with.
//!
//! ```
//! use std::sync::Arc;
//! use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};
//! use rsa_keyfile::{PrimeGenerator, Registry, RsaKeyPair};
//! use rsa_keyfile::pkcs1v15::Pkcs1v15Backend;
//! use sha2::Sha256;
//!
//! let registry = Registry::builder()
//!     .signature("rsa-sha2-256", || Box::new(Pkcs1v15Backend::<Sha256>::new("rsa-sha2-256")))
//!     .generator(|| Box::new(PrimeGenerator::new(ChaCha8Rng::from_seed([42; 32]))))
//!     .build();
//!
//! let pair = RsaKeyPair::generate(Arc::new(registry), 512)?;
//!
//! // Sign
//! let data = b"hello world";
//! let signature = pair.try_sign(data, "rsa-sha2-256")?;
//!
//! // Verify
//! let verifier = pair.try_verifier("rsa-sha2-256")?;
//! assert!(verifier.verify_message(data, &signature)?);
//! # Ok::<(), rsa_keyfile::Error>(())
//! ```

#[cfg(doctest)]
pub struct ReadmeDoctests;

#[macro_use]
extern crate alloc;

pub use num_bigint::BigUint;
pub use rand_core;

mod algorithms;
pub mod encoding;
pub mod errors;
mod key;
pub mod pkcs1v15;
pub mod registry;
pub mod traits;

pub use crate::{
    algorithms::generate::PrimeGenerator,
    encoding::KeyFormat,
    errors::{Error, Result},
    key::{KeyRecord, RsaKeyPair, Verifier},
    registry::{Registry, RegistryBuilder},
    traits::{GeneratedKey, KeyGenerator, PrivateKeyParts, PublicKeyParts, SignatureBackend},
};

/// Signature algorithm used by [`RsaKeyPair::signature`] and [`RsaKeyPair::verifier`].
pub const DEFAULT_SIGNATURE_ALGORITHM: &str = "ssh-rsa";

/// SSH key type name of every key handled by this crate.
pub const KEY_TYPE_NAME: &str = "ssh-rsa";

/// PEM label for the output of [`RsaKeyPair::to_pkcs1_der`].
pub const PKCS1_PEM_LABEL: &str = "RSA PRIVATE KEY";

/// Key size reported before a modulus is known.
pub const DEFAULT_KEY_SIZE: usize = 1024;
