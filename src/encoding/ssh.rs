//! SSH wire encoding as described in [RFC4251 § 5].
//!
//! Covers the public key blob, the signature blob and the agent key body.
//!
//! [RFC4251 § 5]: https://datatracker.ietf.org/doc/html/rfc4251#section-5

use alloc::{string::String, vec::Vec};
use ssh_encoding::{Decode, Encode, Reader as _, Writer as _};
use zeroize::Zeroizing;

use crate::errors::{Error, Result};
use crate::key::KeyRecord;
use crate::traits::{PrivateKeyParts, PublicKeyParts};
use crate::KEY_TYPE_NAME;

/// Cursor over a length-prefixed field buffer.
///
/// Fields are handed back as the raw bytes found on the wire.
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::decode(&mut self.buf)?)
    }

    pub(crate) fn read_string(&mut self) -> Result<Vec<u8>> {
        Ok(Vec::<u8>::decode(&mut self.buf)?)
    }

    /// An `mpint` is carried as-is: sign-extended big-endian bytes.
    pub(crate) fn read_mpint(&mut self) -> Result<Vec<u8>> {
        self.read_string()
    }

    /// Integer prefixed with its bit count rather than its byte count, as
    /// used by the F-Secure format. The magnitude is unsigned.
    pub(crate) fn read_mpint_bits(&mut self) -> Result<Vec<u8>> {
        let bits = self.read_u32()? as usize;
        if bits == 0 {
            return Err(Error::MalformedEncoding);
        }
        let len = bits.div_ceil(8);
        if len > self.buf.remaining_len() {
            return Err(Error::TruncatedInput);
        }

        let pad = usize::from(self.buf.first().map_or(false, |b| b & 0x80 != 0));
        let mut field = vec![0u8; pad + len];
        self.buf.read(&mut field[pad..])?;
        Ok(field)
    }

    pub(crate) fn read_utf8(&mut self) -> Result<String> {
        let bytes = self.read_string()?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.buf.is_finished()
    }
}

/// Builder for a length-prefixed field buffer.
#[derive(Default)]
pub(crate) struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn put_u32(&mut self, value: u32) -> Result<()> {
        Ok(value.encode(&mut self.buf)?)
    }

    pub(crate) fn put_string(&mut self, value: &[u8]) -> Result<()> {
        Ok(value.encode(&mut self.buf)?)
    }

    /// Writes `value` as an `mpint`, adding a `0x00` byte when the high bit is
    /// set so it still reads as non-negative.
    pub(crate) fn put_mpint(&mut self, value: &[u8]) -> Result<()> {
        match value.first() {
            Some(b) if b & 0x80 != 0 => {
                (value.len() + 1).encode(&mut self.buf)?;
                self.buf.write(&[0])?;
                Ok(self.buf.write(value)?)
            }
            _ => self.put_string(value),
        }
    }

    pub(crate) fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

fn expect_key_type(key_type: &[u8]) -> Result<()> {
    if key_type != KEY_TYPE_NAME.as_bytes() {
        return Err(Error::MalformedEncoding);
    }
    Ok(())
}

/// `string "ssh-rsa", mpint e, mpint n`
pub fn encode_public_key_blob(e: &[u8], n: &[u8]) -> Result<Vec<u8>> {
    let mut writer = Writer::with_capacity(e.len() + n.len() + KEY_TYPE_NAME.len() + 14);
    writer.put_string(KEY_TYPE_NAME.as_bytes())?;
    writer.put_mpint(e)?;
    writer.put_mpint(n)?;
    Ok(writer.into_inner())
}

/// Parses a public key blob, returning `(e, n)`.
pub fn decode_public_key_blob(blob: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
    let mut reader = Reader::new(blob);
    expect_key_type(&reader.read_string()?)?;
    let e = reader.read_mpint()?;
    let n = reader.read_mpint()?;
    Ok((e, n))
}

/// `string algorithm, string signature`
pub fn encode_signature_blob(algorithm: &str, signature: &[u8]) -> Result<Vec<u8>> {
    let mut writer = Writer::with_capacity(algorithm.len() + signature.len() + 8);
    writer.put_string(algorithm.as_bytes())?;
    writer.put_string(signature)?;
    Ok(writer.into_inner())
}

/// Splits a signature blob into `(algorithm, signature)`.
///
/// Returns `None` when `blob` is not a well-formed signature blob.
pub fn decode_signature_blob(blob: &[u8]) -> Option<(Vec<u8>, Vec<u8>)> {
    let mut reader = Reader::new(blob);
    let algorithm = reader.read_string().ok()?;
    let signature = reader.read_string().ok()?;
    if !reader.is_finished() {
        return None;
    }
    Some((algorithm, signature))
}

/// Unpacks an agent key body:
/// `string "ssh-rsa", mpint n, e, d, qinv, p, q, string comment`.
pub(crate) fn decode_agent(buf: &[u8]) -> Result<KeyRecord> {
    let mut reader = Reader::new(buf);
    expect_key_type(&reader.read_string()?)?;

    let mut record = KeyRecord::default();
    record.set_modulus(reader.read_mpint()?);
    record.e = Some(reader.read_mpint()?);
    record.d = Some(reader.read_mpint()?);
    record.qinv = Some(reader.read_mpint()?);
    record.p = Some(reader.read_mpint()?);
    record.q = Some(reader.read_mpint()?);
    record.comment = Some(reader.read_utf8()?);

    // exactly eight fields
    if !reader.is_finished() {
        return Err(Error::MalformedEncoding);
    }

    Ok(record)
}

/// Packs a private record into the agent key body.
pub(crate) fn encode_agent(key: &KeyRecord) -> Result<Zeroizing<Vec<u8>>> {
    let n = key.n().ok_or(Error::MissingField("n"))?;
    let e = key.e().ok_or(Error::MissingField("e"))?;
    let d = key.d().ok_or(Error::MissingField("d"))?;
    let qinv = key.qinv().ok_or(Error::MissingField("qinv"))?;
    let p = key.p().ok_or(Error::MissingField("p"))?;
    let q = key.q().ok_or(Error::MissingField("q"))?;
    let comment = key.comment().unwrap_or_default();

    let capacity = [n, e, d, qinv, p, q]
        .iter()
        .map(|f| f.len() + 5)
        .sum::<usize>()
        + KEY_TYPE_NAME.len()
        + comment.len()
        + 8;
    let mut writer = Writer::with_capacity(capacity);
    writer.put_string(KEY_TYPE_NAME.as_bytes())?;
    for field in [n, e, d, qinv, p, q] {
        writer.put_mpint(field)?;
    }
    writer.put_string(comment.as_bytes())?;

    Ok(Zeroizing::new(writer.into_inner()))
}

/// `string "ssh-rsa", mpint n, e, d, qinv, p, q`, the key part of an
/// `openssh-key-v1` private section.
pub(crate) fn encode_openssh_private(key: &KeyRecord) -> Result<Zeroizing<Vec<u8>>> {
    let fields = [
        key.n().ok_or(Error::MissingField("n"))?,
        key.e().ok_or(Error::MissingField("e"))?,
        key.d().ok_or(Error::MissingField("d"))?,
        key.qinv().ok_or(Error::MissingField("qinv"))?,
        key.p().ok_or(Error::MissingField("p"))?,
        key.q().ok_or(Error::MissingField("q"))?,
    ];

    let capacity = fields.iter().map(|f| f.len() + 5).sum::<usize>() + KEY_TYPE_NAME.len() + 4;
    let mut writer = Writer::with_capacity(capacity);
    writer.put_string(KEY_TYPE_NAME.as_bytes())?;
    for field in fields {
        writer.put_mpint(field)?;
    }

    Ok(Zeroizing::new(writer.into_inner()))
}
