//! Decoders for the vendor private key layouts.

use zeroize::Zeroize;

use super::{der, ssh, KeyFormat};
use crate::errors::{Error, Result};
use crate::key::KeyRecord;

/// Decodes a plaintext private blob.
///
/// The result only holds what `buf` itself carries. CRT parameters the
/// format omits are left absent, and PuTTY blobs carry no public half.
pub(crate) fn decode_private(format: KeyFormat, buf: &[u8]) -> Result<KeyRecord> {
    match format {
        KeyFormat::Pkcs1Der => der::decode_pkcs1(buf),
        KeyFormat::PuttyV2 | KeyFormat::PuttyV3 => decode_putty(buf),
        KeyFormat::FSecure => decode_fsecure(buf),
        KeyFormat::OpenSshV1 => decode_openssh_v1(buf),
        KeyFormat::OpenSshAgent => ssh::decode_agent(buf),
    }
}

/// `string d, string p, string q, string qinv`, followed by cipher padding.
fn decode_putty(buf: &[u8]) -> Result<KeyRecord> {
    let mut reader = ssh::Reader::new(buf);

    let mut record = KeyRecord::default();
    record.d = Some(reader.read_mpint()?);
    record.p = Some(reader.read_mpint()?);
    record.q = Some(reader.read_mpint()?);
    record.qinv = Some(reader.read_mpint()?);

    Ok(record)
}

/// Bit-count prefixed `e, d, n, u, p, q`. `u` is `p^-1 mod q` and is
/// dropped in favour of the derived `qinv`.
fn decode_fsecure(buf: &[u8]) -> Result<KeyRecord> {
    if buf.first() == Some(&der::SEQUENCE) {
        return Err(Error::MalformedEncoding);
    }

    let mut reader = ssh::Reader::new(buf);

    let mut record = KeyRecord::default();
    record.e = Some(reader.read_mpint_bits()?);
    record.d = Some(reader.read_mpint_bits()?);
    record.set_modulus(reader.read_mpint_bits()?);
    reader.read_mpint_bits()?.zeroize();
    record.p = Some(reader.read_mpint_bits()?);
    record.q = Some(reader.read_mpint_bits()?);

    Ok(record)
}

/// `uint32 checkint, uint32 checkint, string keytype, mpint n, e, d, qinv,
/// p, q, string comment`, followed by padding.
fn decode_openssh_v1(buf: &[u8]) -> Result<KeyRecord> {
    let mut reader = ssh::Reader::new(buf);

    let check1 = reader.read_u32()?;
    let check2 = reader.read_u32()?;
    if check1 != check2 {
        return Err(Error::IntegrityCheckFailed);
    }

    let _key_type = reader.read_string()?;

    let mut record = KeyRecord::default();
    record.set_modulus(reader.read_mpint()?);
    record.e = Some(reader.read_mpint()?);
    record.d = Some(reader.read_mpint()?);
    record.qinv = Some(reader.read_mpint()?);
    record.p = Some(reader.read_mpint()?);
    record.q = Some(reader.read_mpint()?);
    record.comment = Some(reader.read_utf8()?);

    Ok(record)
}
