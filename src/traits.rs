//! RSA-related trait definitions.

mod generator;
pub(crate) mod keys;
mod signature;

pub use generator::{GeneratedKey, KeyGenerator};
pub use keys::{PrivateKeyParts, PublicKeyParts};
pub use signature::SignatureBackend;
