//! PKCS#1 v1.5 signature padding as described in [RFC8017 § 8.2].
//!
//! The padding, unpadding and `DigestInfo` prefix routines are carried over
//! from the RustCrypto `rsa` crate's PKCS#1 v1.5 implementation with their
//! error type swapped for this crate's.
//!
//! [RFC8017 § 8.2]: https://datatracker.ietf.org/doc/html/rfc8017#section-8.2

use alloc::vec::Vec;
use const_oid::AssociatedOid;
use digest::Digest;
use subtle::ConstantTimeEq;

use crate::errors::{Error, Result};

#[inline]
pub(crate) fn pkcs1v15_sign_pad(prefix: &[u8], hashed: &[u8], k: usize) -> Result<Vec<u8>> {
    let hash_len = hashed.len();
    let t_len = prefix.len() + hashed.len();
    if k < t_len + 11 {
        return Err(Error::MessageTooLong);
    }

    // EM = 0x00 || 0x01 || PS || 0x00 || T
    let mut em = vec![0xff; k];
    em[0] = 0;
    em[1] = 1;
    em[k - t_len - 1] = 0;
    em[k - t_len..k - hash_len].copy_from_slice(prefix);
    em[k - hash_len..k].copy_from_slice(hashed);

    Ok(em)
}

#[inline]
pub(crate) fn pkcs1v15_sign_unpad(prefix: &[u8], hashed: &[u8], em: &[u8], k: usize) -> Result<()> {
    let hash_len = hashed.len();
    let t_len = prefix.len() + hashed.len();
    if k < t_len + 11 || em.len() != k {
        return Err(Error::Verification);
    }

    // EM = 0x00 || 0x01 || PS || 0x00 || T
    let mut ok = em[0].ct_eq(&0u8);
    ok &= em[1].ct_eq(&1u8);
    ok &= em[k - hash_len..k].ct_eq(hashed);
    ok &= em[k - t_len..k - hash_len].ct_eq(prefix);
    ok &= em[k - t_len - 1].ct_eq(&0u8);

    for el in em.iter().skip(2).take(k - t_len - 3) {
        ok &= el.ct_eq(&0xff)
    }

    if ok.unwrap_u8() != 1 {
        return Err(Error::Verification);
    }

    Ok(())
}

/// prefix = 0x30 <oid_len + 8 + digest_len> 0x30 <oid_len + 4> 0x06 <oid_len> oid 0x05 0x00 0x04 <digest_len>
#[inline]
pub(crate) fn pkcs1v15_generate_prefix<D>() -> Vec<u8>
where
    D: Digest + AssociatedOid,
{
    let oid = D::OID.as_bytes();
    let oid_len = oid.len() as u8;
    let digest_len = <D as Digest>::output_size() as u8;
    let mut v = vec![
        0x30,
        oid_len + 8 + digest_len,
        0x30,
        oid_len + 4,
        0x6,
        oid_len,
    ];
    v.extend_from_slice(oid);
    v.extend_from_slice(&[0x05, 0x00, 0x04, digest_len]);
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use sha1::Sha1;
    use sha2::{Sha256, Sha512};

    #[test]
    fn test_prefixes() {
        assert_eq!(
            pkcs1v15_generate_prefix::<Sha1>(),
            hex!("3021300906052b0e03021a05000414")
        );
        assert_eq!(
            pkcs1v15_generate_prefix::<Sha256>(),
            hex!("3031300d060960864801650304020105000420")
        );
        assert_eq!(
            pkcs1v15_generate_prefix::<Sha512>(),
            hex!("3051300d060960864801650304020305000440")
        );
    }

    #[test]
    fn test_pad_unpad() {
        let prefix = pkcs1v15_generate_prefix::<Sha1>();
        let hashed = [0x5au8; 20];
        let em = pkcs1v15_sign_pad(&prefix, &hashed, 64).unwrap();
        assert_eq!(&em[..2], &[0, 1]);
        assert!(pkcs1v15_sign_unpad(&prefix, &hashed, &em, 64).is_ok());

        let mut tampered = em.clone();
        tampered[10] = 0xfe;
        assert_eq!(
            pkcs1v15_sign_unpad(&prefix, &hashed, &tampered, 64),
            Err(Error::Verification)
        );
    }

    #[test]
    fn test_modulus_too_small() {
        let prefix = pkcs1v15_generate_prefix::<Sha512>();
        let hashed = [0u8; 64];
        assert_eq!(
            pkcs1v15_sign_pad(&prefix, &hashed, 64),
            Err(Error::MessageTooLong)
        );
    }
}
