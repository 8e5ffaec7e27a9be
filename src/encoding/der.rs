//! Minimal ASN.1 DER support for the PKCS#1 `RSAPrivateKey` structure.
//!
//! ```text
//! RSAPrivateKey ::= SEQUENCE {
//!     version           Version,
//!     modulus           INTEGER,  -- n
//!     publicExponent    INTEGER,  -- e
//!     privateExponent   INTEGER,  -- d
//!     prime1            INTEGER,  -- p
//!     prime2            INTEGER,  -- q
//!     exponent1         INTEGER,  -- d mod (p-1)
//!     exponent2         INTEGER,  -- d mod (q-1)
//!     coefficient       INTEGER,  -- (inverse of q) mod p
//! }
//! ```

use alloc::vec::Vec;
use zeroize::Zeroizing;

use crate::errors::{Error, Result};
use crate::key::KeyRecord;
use crate::traits::{PrivateKeyParts, PublicKeyParts};

/// `INTEGER` tag.
pub const INTEGER: u8 = 0x02;

/// Constructed `SEQUENCE` tag.
pub const SEQUENCE: u8 = 0x30;

/// Reads a DER length starting at `pos`.
///
/// Returns the decoded length and the position just past the length octets.
/// Running out of input while reading the length is
/// [`Error::MalformedEncoding`], as are the indefinite form (`0x80`) and
/// lengths that do not fit in a `usize`.
pub fn read_length(buf: &[u8], pos: usize) -> Result<(usize, usize)> {
    let first = *buf.get(pos).ok_or(Error::MalformedEncoding)?;
    let mut pos = pos + 1;

    if first & 0x80 == 0 {
        return Ok((usize::from(first), pos));
    }

    let count = usize::from(first & 0x7f);
    if count == 0 || count > core::mem::size_of::<usize>() {
        return Err(Error::MalformedEncoding);
    }

    let mut len = 0usize;
    for _ in 0..count {
        let b = *buf.get(pos).ok_or(Error::MalformedEncoding)?;
        len = (len << 8) | usize::from(b);
        pos += 1;
    }

    Ok((len, pos))
}

/// Reads an `INTEGER` TLV starting at `pos`.
///
/// The returned slice is the raw content octets, sign padding included.
pub fn read_integer(buf: &[u8], pos: usize) -> Result<(&[u8], usize)> {
    let tag = *buf.get(pos).ok_or(Error::TruncatedInput)?;
    if tag != INTEGER {
        return Err(Error::UnexpectedTag {
            expected: INTEGER,
            actual: tag,
        });
    }

    let (len, pos) = read_length(buf, pos + 1)?;
    if len == 0 {
        return Err(Error::MalformedEncoding);
    }
    let end = pos.checked_add(len).ok_or(Error::TruncatedInput)?;
    let bytes = buf.get(pos..end).ok_or(Error::TruncatedInput)?;

    Ok((bytes, end))
}

/// Encodes `bytes` as an `INTEGER`. The caller is responsible for sign padding.
pub fn write_integer(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + 6);
    put_tlv(&mut out, INTEGER, bytes);
    out
}

/// Wraps already encoded `content` in a `SEQUENCE`.
pub fn write_sequence(content: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len() + 6);
    put_tlv(&mut out, SEQUENCE, content);
    out
}

fn put_length(out: &mut Vec<u8>, len: usize) {
    if len < 0x80 {
        out.push(len as u8);
        return;
    }

    let bytes = len.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    out.push(0x80 | (bytes.len() - skip) as u8);
    out.extend_from_slice(&bytes[skip..]);
}

fn put_tlv(out: &mut Vec<u8>, tag: u8, content: &[u8]) {
    out.push(tag);
    put_length(out, content.len());
    out.extend_from_slice(content);
}

/// Parses a PKCS#1 `RSAPrivateKey`.
///
/// The version is skipped without validation. Bytes after the outer
/// `SEQUENCE` are ignored.
pub(crate) fn decode_pkcs1(buf: &[u8]) -> Result<KeyRecord> {
    let tag = *buf.first().ok_or(Error::TruncatedInput)?;
    if tag != SEQUENCE {
        return Err(Error::UnexpectedTag {
            expected: SEQUENCE,
            actual: tag,
        });
    }

    let (len, pos) = read_length(buf, 1)?;
    let end = pos.checked_add(len).ok_or(Error::TruncatedInput)?;
    let body = buf.get(..end).ok_or(Error::TruncatedInput)?;

    let (_version, pos) = read_integer(body, pos)?;
    let (n, pos) = read_integer(body, pos)?;
    let (e, pos) = read_integer(body, pos)?;
    let (d, pos) = read_integer(body, pos)?;
    let (p, pos) = read_integer(body, pos)?;
    let (q, pos) = read_integer(body, pos)?;
    let (dp, pos) = read_integer(body, pos)?;
    let (dq, pos) = read_integer(body, pos)?;
    let (qinv, _) = read_integer(body, pos)?;

    let mut record = KeyRecord::default();
    record.set_modulus(n.to_vec());
    record.e = Some(e.to_vec());
    record.d = Some(d.to_vec());
    record.p = Some(p.to_vec());
    record.q = Some(q.to_vec());
    record.dp = Some(dp.to_vec());
    record.dq = Some(dq.to_vec());
    record.qinv = Some(qinv.to_vec());

    Ok(record)
}

/// Serializes a fully populated record as a two-prime PKCS#1 `RSAPrivateKey`.
pub(crate) fn encode_pkcs1(key: &KeyRecord) -> Result<Zeroizing<Vec<u8>>> {
    let fields = [
        key.n().ok_or(Error::MissingField("n"))?,
        key.e().ok_or(Error::MissingField("e"))?,
        key.d().ok_or(Error::MissingField("d"))?,
        key.p().ok_or(Error::MissingField("p"))?,
        key.q().ok_or(Error::MissingField("q"))?,
        key.dp().ok_or(Error::MissingField("dp"))?,
        key.dq().ok_or(Error::MissingField("dq"))?,
        key.qinv().ok_or(Error::MissingField("qinv"))?,
    ];

    let content_len = fields.iter().map(|f| f.len() + 6).sum::<usize>() + 3;
    let mut content = Zeroizing::new(Vec::with_capacity(content_len));
    // two-prime version
    put_tlv(&mut content, INTEGER, &[0]);
    for field in fields {
        put_tlv(&mut content, INTEGER, field);
    }

    let mut out = Zeroizing::new(Vec::with_capacity(content.len() + 6));
    put_tlv(&mut out, SEQUENCE, &content);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use rstest::rstest;

    #[rstest]
    #[case(0, &hex!("00"))]
    #[case(1, &hex!("01"))]
    #[case(127, &hex!("7f"))]
    #[case(128, &hex!("8180"))]
    #[case(255, &hex!("81ff"))]
    #[case(256, &hex!("820100"))]
    #[case(609, &hex!("820261"))]
    #[case(65535, &hex!("82ffff"))]
    #[case(65536, &hex!("83010000"))]
    fn test_length_round_trip(#[case] len: usize, #[case] encoded: &[u8]) {
        let mut out = Vec::new();
        put_length(&mut out, len);
        assert_eq!(out, encoded);
        assert_eq!(read_length(encoded, 0).unwrap(), (len, encoded.len()));
    }

    #[rstest]
    #[case(&[])]
    #[case(&hex!("80"))]
    #[case(&hex!("82"))]
    #[case(&hex!("8201"))]
    #[case(&hex!("89010203040506070809"))]
    fn test_bad_length(#[case] encoded: &[u8]) {
        assert_eq!(read_length(encoded, 0), Err(Error::MalformedEncoding));
    }

    #[test]
    fn test_read_integer() {
        let buf = hex!("020300ff01 020101");
        let (value, pos) = read_integer(&buf, 0).unwrap();
        assert_eq!(value, hex!("00ff01"));
        assert_eq!(pos, 5);
        let (value, pos) = read_integer(&buf, pos).unwrap();
        assert_eq!(value, hex!("01"));
        assert_eq!(pos, buf.len());

        assert_eq!(read_integer(&buf, pos), Err(Error::TruncatedInput));
    }

    #[test]
    fn test_read_integer_errors() {
        assert_eq!(
            read_integer(&hex!("040101"), 0),
            Err(Error::UnexpectedTag {
                expected: INTEGER,
                actual: 0x04
            })
        );
        assert_eq!(read_integer(&hex!("020401"), 0), Err(Error::TruncatedInput));
        assert_eq!(read_integer(&hex!("0200"), 0), Err(Error::MalformedEncoding));
    }

    #[test]
    fn test_write_integer() {
        assert_eq!(write_integer(&hex!("00")), hex!("020100"));
        assert_eq!(write_integer(&hex!("010001")), hex!("0203010001"));

        let long = [0x11u8; 129];
        let encoded = write_integer(&long);
        assert_eq!(&encoded[..3], &hex!("028181"));
        assert_eq!(&encoded[3..], &long[..]);
    }

    #[test]
    fn test_write_sequence() {
        let content = [write_integer(&[0]), write_integer(&[5])].concat();
        assert_eq!(write_sequence(&content), hex!("3006020100020105"));
    }

    #[test]
    fn test_textbook_key() {
        // p = 61, q = 53, e = 17, d = 2753
        let der = hex!(
            "301d"
            "020100"
            "02020ca1"
            "020111"
            "02020ac1"
            "02013d"
            "020135"
            "020135"
            "020131"
            "020126"
        );
        let record = decode_pkcs1(&der).unwrap();
        assert_eq!(record.n(), Some(&hex!("0ca1")[..]));
        assert_eq!(record.e(), Some(&hex!("11")[..]));
        assert_eq!(record.d(), Some(&hex!("0ac1")[..]));
        assert_eq!(record.qinv(), Some(&hex!("26")[..]));
        assert_eq!(record.bit_length(), Some(12));

        assert_eq!(&encode_pkcs1(&record).unwrap()[..], &der[..]);
    }

    #[test]
    fn test_decode_ignores_trailing_padding() {
        let der = hex!("301d 020100 02020ca1 020111 02020ac1 02013d 020135 020135 020131 020126 0303");
        assert_eq!(decode_pkcs1(&der).unwrap().dq(), Some(&hex!("31")[..]));
    }

    #[test]
    fn test_decode_rejects_non_sequence() {
        assert_eq!(
            decode_pkcs1(&hex!("0201000201")).unwrap_err(),
            Error::UnexpectedTag {
                expected: SEQUENCE,
                actual: INTEGER
            }
        );
        assert_eq!(decode_pkcs1(&[]).unwrap_err(), Error::TruncatedInput);
    }

    #[test]
    fn test_decode_rejects_short_sequence() {
        // version and modulus only
        let der = hex!("3007 020100 02020ca1");
        assert_eq!(decode_pkcs1(&der).unwrap_err(), Error::TruncatedInput);

        // sequence length runs past the buffer
        let der = hex!("3010 020100 02020ca1");
        assert_eq!(decode_pkcs1(&der).unwrap_err(), Error::TruncatedInput);
    }

    #[test]
    fn test_encode_requires_every_field() {
        let mut record = KeyRecord::default();
        record.set_modulus(hex!("0ca1").to_vec());
        record.e = Some(hex!("11").to_vec());
        assert_eq!(encode_pkcs1(&record), Err(Error::MissingField("d")));
    }
}
