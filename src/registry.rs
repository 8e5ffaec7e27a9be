//! Table of pluggable signature backends and the key generator.

use alloc::{boxed::Box, collections::BTreeMap, string::String};
use core::fmt;

use sha1::Sha1;
use sha2::{Sha256, Sha512};

use crate::pkcs1v15::Pkcs1v15Backend;
use crate::traits::{KeyGenerator, SignatureBackend};

/// Builds a fresh, unkeyed signature backend.
pub type SignatureFactory = Box<dyn Fn() -> Box<dyn SignatureBackend> + Send + Sync>;

/// Builds a key generator.
pub type GeneratorFactory = Box<dyn Fn() -> Box<dyn KeyGenerator> + Send + Sync>;

/// Maps algorithm identifiers to signature backends and holds the key
/// generator. Built once, then shared by every key pair that uses it.
pub struct Registry {
    signatures: BTreeMap<String, SignatureFactory>,
    generator: Option<GeneratorFactory>,
}

impl Registry {
    /// Start building a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder {
            registry: Registry::empty(),
        }
    }

    /// A registry with nothing registered.
    pub fn empty() -> Self {
        Self {
            signatures: BTreeMap::new(),
            generator: None,
        }
    }

    /// A new backend for `algorithm`, if one is registered.
    pub fn signature_backend(&self, algorithm: &str) -> Option<Box<dyn SignatureBackend>> {
        self.signatures.get(algorithm).map(|factory| factory())
    }

    /// Whether a backend is registered for `algorithm`.
    pub fn supports(&self, algorithm: &str) -> bool {
        self.signatures.contains_key(algorithm)
    }

    /// Registered algorithm identifiers, in sorted order.
    pub fn algorithms(&self) -> impl Iterator<Item = &str> {
        self.signatures.keys().map(String::as_str)
    }

    /// A new key generator, if one is registered.
    pub fn key_generator(&self) -> Option<Box<dyn KeyGenerator>> {
        self.generator.as_ref().map(|factory| factory())
    }
}

impl Default for Registry {
    /// The PKCS#1 v1.5 backends for `ssh-rsa`, `rsa-sha2-256` and
    /// `rsa-sha2-512`, plus an OS-seeded [`PrimeGenerator`] when the
    /// `getrandom` feature is enabled.
    ///
    /// [`PrimeGenerator`]: crate::PrimeGenerator
    fn default() -> Self {
        let builder = Registry::builder()
            .signature("ssh-rsa", || {
                Box::new(Pkcs1v15Backend::<Sha1>::new("ssh-rsa"))
            })
            .signature("rsa-sha2-256", || {
                Box::new(Pkcs1v15Backend::<Sha256>::new("rsa-sha2-256"))
            })
            .signature("rsa-sha2-512", || {
                Box::new(Pkcs1v15Backend::<Sha512>::new("rsa-sha2-512"))
            });

        #[cfg(feature = "getrandom")]
        let builder = builder.generator(|| {
            Box::new(crate::PrimeGenerator::new(rand_core::OsRng))
        });

        builder.build()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("signatures", &self.signatures.keys().collect::<alloc::vec::Vec<_>>())
            .field("generator", &self.generator.is_some())
            .finish()
    }
}

/// Builder for [`Registry`].
pub struct RegistryBuilder {
    registry: Registry,
}

impl RegistryBuilder {
    /// Registers `factory` under `algorithm`, replacing any earlier entry.
    pub fn signature<F>(mut self, algorithm: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Box<dyn SignatureBackend> + Send + Sync + 'static,
    {
        self.registry
            .signatures
            .insert(algorithm.into(), Box::new(factory));
        self
    }

    /// Sets the key generator factory.
    pub fn generator<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn KeyGenerator> + Send + Sync + 'static,
    {
        self.registry.generator = Some(Box::new(factory));
        self
    }

    /// Finish building.
    pub fn build(self) -> Registry {
        self.registry
    }
}

impl fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RegistryBuilder").field(&self.registry).finish()
    }
}
