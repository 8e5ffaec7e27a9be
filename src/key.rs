use alloc::{
    boxed::Box,
    string::{String, ToString},
    sync::Arc,
    vec::Vec,
};
use core::fmt;

use tracing::{debug, error};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::algorithms::crt::derive_missing;
use crate::algorithms::pad::bit_length;
use crate::encoding::{decode_private, der, ssh, KeyFormat};
use crate::errors::{Error, Result};
use crate::registry::Registry;
use crate::traits::{PrivateKeyParts, PublicKeyParts, SignatureBackend};
use crate::{DEFAULT_KEY_SIZE, DEFAULT_SIGNATURE_ALGORITHM, KEY_TYPE_NAME};

/// The numeric fields of an RSA key.
///
/// Every field is a big-endian, sign-extended integer byte string exactly as
/// it was read from the source encoding. `dp`, `dq` and `qinv` are filled in
/// once, when a decode is committed, if the source did not carry them.
#[derive(Clone, Default)]
pub struct KeyRecord {
    pub(crate) n: Option<Vec<u8>>,
    pub(crate) e: Option<Vec<u8>>,
    pub(crate) d: Option<Vec<u8>>,
    pub(crate) p: Option<Vec<u8>>,
    pub(crate) q: Option<Vec<u8>>,
    pub(crate) dp: Option<Vec<u8>>,
    pub(crate) dq: Option<Vec<u8>>,
    pub(crate) qinv: Option<Vec<u8>>,
    pub(crate) comment: Option<String>,
    bits: Option<usize>,
}

impl KeyRecord {
    /// Sets the modulus and caches its bit length.
    pub(crate) fn set_modulus(&mut self, n: Vec<u8>) {
        self.bits = Some(bit_length(&n));
        self.n = Some(n);
    }

    /// Bit length of the modulus, if known.
    pub fn bit_length(&self) -> Option<usize> {
        self.bits
    }

    /// Free-text label attached to the key.
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Whether the record holds a private exponent.
    pub fn is_private(&self) -> bool {
        self.d.is_some()
    }

    /// Fills in absent CRT parameters from `d`, `p` and `q`.
    ///
    /// Fields that are already present are never recomputed.
    pub(crate) fn derive_crt(&mut self) -> Result<()> {
        let mut crt = derive_missing(&*self)?;
        if let Some(dp) = crt.dp.take() {
            self.dp = Some(dp);
        }
        if let Some(dq) = crt.dq.take() {
            self.dq = Some(dq);
        }
        if let Some(qinv) = crt.qinv.take() {
            self.qinv = Some(qinv);
        }
        Ok(())
    }

    /// Takes the public half from `other` where this record has none.
    fn merge_public(&mut self, other: &KeyRecord) {
        if self.n.is_none() {
            if let Some(n) = &other.n {
                self.set_modulus(n.clone());
            }
        }
        if self.e.is_none() {
            self.e = other.e.clone();
        }
        if self.comment.is_none() {
            self.comment = other.comment.clone();
        }
    }
}

impl Zeroize for KeyRecord {
    fn zeroize(&mut self) {
        self.d.zeroize();
        self.p.zeroize();
        self.q.zeroize();
        self.dp.zeroize();
        self.dq.zeroize();
        self.qinv.zeroize();
        self.comment.zeroize();
    }
}

impl Drop for KeyRecord {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ZeroizeOnDrop for KeyRecord {}

impl fmt::Debug for KeyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyRecord")
            .field("n", &self.n)
            .field("e", &self.e)
            .field("bits", &self.bits)
            .field("comment", &self.comment)
            .field("private", &self.is_private())
            .finish_non_exhaustive()
    }
}

impl PublicKeyParts for KeyRecord {
    fn n(&self) -> Option<&[u8]> {
        self.n.as_deref()
    }

    fn e(&self) -> Option<&[u8]> {
        self.e.as_deref()
    }
}

impl PrivateKeyParts for KeyRecord {
    fn d(&self) -> Option<&[u8]> {
        self.d.as_deref()
    }

    fn p(&self) -> Option<&[u8]> {
        self.p.as_deref()
    }

    fn q(&self) -> Option<&[u8]> {
        self.q.as_deref()
    }

    fn dp(&self) -> Option<&[u8]> {
        self.dp.as_deref()
    }

    fn dq(&self) -> Option<&[u8]> {
        self.dq.as_deref()
    }

    fn qinv(&self) -> Option<&[u8]> {
        self.qinv.as_deref()
    }
}

/// An RSA key pair bound to a [`Registry`] of signature backends.
///
/// The pair starts out empty, public-only or encrypted, and gains private
/// material through [`decode`](Self::decode), [`decrypt`](Self::decrypt),
/// [`from_agent`](Self::from_agent) or [`generate`](Self::generate).
pub struct RsaKeyPair {
    registry: Arc<Registry>,
    record: KeyRecord,
    format: Option<KeyFormat>,
    encrypted: Option<Vec<u8>>,
    public_key_blob: Option<Vec<u8>>,
}

impl fmt::Debug for RsaKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaKeyPair")
            .field("record", &self.record)
            .field("format", &self.format)
            .field("encrypted", &self.is_encrypted())
            .finish_non_exhaustive()
    }
}

impl RsaKeyPair {
    /// Creates an empty key pair.
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            record: KeyRecord::default(),
            format: None,
            encrypted: None,
            public_key_blob: None,
        }
    }

    /// Creates a public-only key pair from the modulus and public exponent.
    pub fn from_public(registry: Arc<Registry>, n: &[u8], e: &[u8]) -> Self {
        let mut pair = Self::new(registry);
        pair.record.set_modulus(n.to_vec());
        pair.record.e = Some(e.to_vec());
        pair
    }

    /// Creates a public-only key pair from an `ssh-rsa` public key blob.
    ///
    /// The blob is kept and handed back unchanged by
    /// [`public_key_blob`](Self::public_key_blob).
    pub fn from_public_key_blob(registry: Arc<Registry>, blob: &[u8]) -> Result<Self> {
        let (e, n) = ssh::decode_public_key_blob(blob)?;
        let mut pair = Self::from_public(registry, &n, &e);
        pair.public_key_blob = Some(blob.to_vec());
        Ok(pair)
    }

    /// Holds a private blob that still has to be decrypted.
    pub fn encrypted(registry: Arc<Registry>, format: KeyFormat, ciphertext: Vec<u8>) -> Self {
        let mut pair = Self::new(registry);
        pair.set_encrypted(format, ciphertext);
        pair
    }

    /// Attaches an encrypted private blob to this pair, typically one whose
    /// public half is already known.
    pub fn set_encrypted(&mut self, format: KeyFormat, ciphertext: Vec<u8>) {
        self.format = Some(format);
        self.encrypted = Some(ciphertext);
    }

    /// Imports the key body of an SSH agent `ADD_IDENTITY` request.
    pub fn from_agent(registry: Arc<Registry>, blob: &[u8]) -> Result<Self> {
        let mut pair = Self::new(registry);
        pair.decode(KeyFormat::OpenSshAgent, blob)?;
        Ok(pair)
    }

    /// Generates a new key with the registry's key generator.
    pub fn generate(registry: Arc<Registry>, bit_size: usize) -> Result<Self> {
        let mut generator = registry
            .key_generator()
            .ok_or_else(|| Error::BackendFailure("no key generator registered".to_string()))?;
        let key = generator.generate(bit_size)?;

        let mut record = KeyRecord::default();
        record.set_modulus(key.n.clone());
        record.e = Some(key.e.clone());
        record.d = Some(key.d.clone());
        record.p = Some(key.p.clone());
        record.q = Some(key.q.clone());
        record.dp = Some(key.dp.clone());
        record.dq = Some(key.dq.clone());
        record.qinv = Some(key.qinv.clone());
        debug!(bits = record.bit_length(), "generated key");

        let mut pair = Self::new(registry);
        pair.record = record;
        Ok(pair)
    }

    /// Decodes a plaintext private blob and commits it to this pair.
    ///
    /// Public fields already held are kept for formats that do not carry
    /// them. Missing CRT parameters are derived before anything is
    /// committed, so on failure the pair is left untouched. A successful
    /// decode replaces any encrypted blob still held.
    pub fn decode(&mut self, format: KeyFormat, plain: &[u8]) -> Result<()> {
        let decoded = decode_private(format, plain).and_then(|mut record| {
            record.merge_public(&self.record);
            record.derive_crt()?;
            Ok(record)
        });

        match decoded {
            Ok(record) => {
                self.record = record;
                self.format = Some(format);
                self.encrypted = None;
                debug!(?format, bits = self.record.bit_length(), "decoded key");
                Ok(())
            }
            Err(err) => {
                error!(?format, %err, "failed to parse key");
                Err(err)
            }
        }
    }

    /// Decrypts the held private blob with `decrypt` and decodes the
    /// plaintext in the format the blob was registered with.
    ///
    /// The pair stays encrypted if either step fails. Does nothing if the
    /// pair is not encrypted.
    pub fn decrypt<F>(&mut self, decrypt: F) -> Result<()>
    where
        F: FnOnce(&[u8]) -> Result<Zeroizing<Vec<u8>>>,
    {
        let ciphertext = match &self.encrypted {
            Some(ciphertext) => ciphertext,
            None => return Ok(()),
        };
        let format = self.format.ok_or(Error::MissingField("format"))?;

        let plain = decrypt(ciphertext)?;
        self.decode(format, &plain)
    }

    /// Whether the private half is still waiting on [`decrypt`](Self::decrypt).
    pub fn is_encrypted(&self) -> bool {
        self.encrypted.is_some()
    }

    fn ensure_decrypted(&self) -> Result<()> {
        if self.is_encrypted() {
            return Err(Error::IsEncrypted);
        }
        Ok(())
    }

    /// Serializes the key as a PKCS#1 `RSAPrivateKey`, ready for
    /// [`PKCS1_PEM_LABEL`](crate::PKCS1_PEM_LABEL) framing.
    pub fn to_pkcs1_der(&self) -> Result<Zeroizing<Vec<u8>>> {
        self.ensure_decrypted()?;
        der::encode_pkcs1(&self.record)
    }

    /// Serializes the key as an SSH agent key body.
    pub fn to_agent(&self) -> Result<Zeroizing<Vec<u8>>> {
        self.ensure_decrypted()?;
        ssh::encode_agent(&self.record)
    }

    /// Serializes the key fields of an `openssh-key-v1` private section.
    pub fn to_openssh_v1_private_blob(&self) -> Result<Zeroizing<Vec<u8>>> {
        self.ensure_decrypted()?;
        ssh::encode_openssh_private(&self.record)
    }

    /// The `ssh-rsa` public key blob.
    ///
    /// Returns the blob this pair was created from, or one built from `e`
    /// and `n`, or `None` when neither is available.
    pub fn public_key_blob(&self) -> Option<Vec<u8>> {
        if let Some(blob) = &self.public_key_blob {
            return Some(blob.clone());
        }
        let e = self.record.e()?;
        let n = self.record.n()?;
        ssh::encode_public_key_blob(e, n).ok()
    }

    /// Modulus size in bits, or [`DEFAULT_KEY_SIZE`] before one is known.
    pub fn key_size(&self) -> usize {
        self.record.bit_length().unwrap_or(DEFAULT_KEY_SIZE)
    }

    /// Always `"ssh-rsa"`.
    pub fn key_type_name(&self) -> &'static str {
        KEY_TYPE_NAME
    }

    /// Format of the last decoded or registered private blob.
    pub fn format(&self) -> Option<KeyFormat> {
        self.format
    }

    /// Free-text label attached to the key.
    pub fn comment(&self) -> Option<&str> {
        self.record.comment()
    }

    /// Replaces the key comment.
    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.record.comment = Some(comment.into());
    }

    /// The numeric key fields.
    pub fn record(&self) -> &KeyRecord {
        &self.record
    }

    /// Registry this pair resolves signature algorithms with.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    fn backend(&self, algorithm: &str) -> Result<Box<dyn SignatureBackend>> {
        self.registry
            .signature_backend(algorithm)
            .ok_or_else(|| Error::UnsupportedAlgorithm(algorithm.to_string()))
    }

    /// Signs `data` with `algorithm` and wraps the result in a signature blob.
    pub fn try_sign(&self, data: &[u8], algorithm: &str) -> Result<Vec<u8>> {
        let mut backend = self.backend(algorithm)?;
        self.ensure_decrypted()?;
        let d = self.record.d().ok_or(Error::MissingField("d"))?;
        let n = self.record.n().ok_or(Error::MissingField("n"))?;

        backend.set_private_key(d, n)?;
        backend.update(data);
        let signature = backend.sign()?;

        ssh::encode_signature_blob(algorithm, &signature)
    }

    /// [`try_sign`](Self::try_sign) that logs failures and returns `None`.
    pub fn signature_with(&self, data: &[u8], algorithm: &str) -> Option<Vec<u8>> {
        match self.try_sign(data, algorithm) {
            Ok(signature) => Some(signature),
            Err(err) => {
                error!(algorithm, %err, "failed to generate signature");
                None
            }
        }
    }

    /// Signs `data` with [`DEFAULT_SIGNATURE_ALGORITHM`].
    pub fn signature(&self, data: &[u8]) -> Option<Vec<u8>> {
        self.signature_with(data, DEFAULT_SIGNATURE_ALGORITHM)
    }

    /// Builds a verifier for `algorithm` keyed with this pair's public half.
    ///
    /// When the record has no `e`/`n`, they are read from the public key
    /// blob the pair was created from.
    pub fn try_verifier(&self, algorithm: &str) -> Result<Verifier> {
        let mut backend = self.backend(algorithm)?;

        match (self.record.e(), self.record.n()) {
            (Some(e), Some(n)) => backend.set_public_key(e, n)?,
            _ => {
                let blob = self
                    .public_key_blob
                    .as_deref()
                    .ok_or(Error::MissingField("n"))?;
                let (e, n) = ssh::decode_public_key_blob(blob)?;
                backend.set_public_key(&e, &n)?;
            }
        }

        Ok(Verifier {
            algorithm: algorithm.to_string(),
            backend,
        })
    }

    /// [`try_verifier`](Self::try_verifier) that logs failures and returns `None`.
    pub fn verifier_with(&self, algorithm: &str) -> Option<Verifier> {
        match self.try_verifier(algorithm) {
            Ok(verifier) => Some(verifier),
            Err(err) => {
                error!(algorithm, %err, "failed to create verifier");
                None
            }
        }
    }

    /// Verifier for [`DEFAULT_SIGNATURE_ALGORITHM`].
    pub fn verifier(&self) -> Option<Verifier> {
        self.verifier_with(DEFAULT_SIGNATURE_ALGORITHM)
    }

    /// Wipes the private fields and the comment. The public half is kept.
    pub fn dispose(&mut self) {
        self.record.zeroize();
        self.encrypted.zeroize();
    }
}

/// A signature backend keyed with a public key, ready to check signatures.
pub struct Verifier {
    algorithm: String,
    backend: Box<dyn SignatureBackend>,
}

impl fmt::Debug for Verifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Verifier")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl Verifier {
    /// Algorithm identifier this verifier was built for.
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Appends message bytes.
    pub fn update(&mut self, data: &[u8]) {
        self.backend.update(data);
    }

    /// Checks `signature` against the bytes passed to [`update`](Self::update).
    ///
    /// `signature` may be raw signature bytes or a signature blob.
    pub fn verify(&mut self, signature: &[u8]) -> Result<bool> {
        self.backend.verify(signature)
    }

    /// Checks `signature` over `data` in one call.
    pub fn verify_message(mut self, data: &[u8], signature: &[u8]) -> Result<bool> {
        self.update(data);
        self.verify(signature)
    }
}
