//! Decoding and encoding of the supported key containers, checked against
//! fixtures produced by OpenSSL for a single 1024-bit key.

use std::sync::Arc;

use rsa_keyfile::{
    Error, KeyFormat, KeyRecord, PrivateKeyParts, PublicKeyParts, Registry, RsaKeyPair,
};
use zeroize::Zeroizing;

const DER: &[u8] = include_bytes!("examples/rsa1024.der");
const PUBLIC: &[u8] = include_bytes!("examples/rsa1024-pub.bin");
const PUTTY: &[u8] = include_bytes!("examples/rsa1024-putty.bin");
const FSECURE: &[u8] = include_bytes!("examples/rsa1024-fsecure.bin");
const OPENSSH: &[u8] = include_bytes!("examples/rsa1024-openssh-v1.bin");
const AGENT: &[u8] = include_bytes!("examples/rsa1024-agent.bin");

const COMMENT: &str = "alice@example.com";

fn registry() -> Arc<Registry> {
    Arc::new(Registry::default())
}

fn fields(record: &KeyRecord) -> [Option<Vec<u8>>; 8] {
    [
        record.n(),
        record.e(),
        record.d(),
        record.p(),
        record.q(),
        record.dp(),
        record.dq(),
        record.qinv(),
    ]
    .map(|f| f.map(<[u8]>::to_vec))
}

fn decode(format: KeyFormat, buf: &[u8]) -> RsaKeyPair {
    let mut pair = RsaKeyPair::new(registry());
    pair.decode(format, buf).unwrap();
    pair
}

fn putty_pair() -> RsaKeyPair {
    let mut pair = RsaKeyPair::from_public_key_blob(registry(), PUBLIC).unwrap();
    pair.decode(KeyFormat::PuttyV2, PUTTY).unwrap();
    pair
}

#[test]
fn decode_pkcs1_der() {
    let pair = decode(KeyFormat::Pkcs1Der, DER);
    assert_eq!(pair.format(), Some(KeyFormat::Pkcs1Der));
    assert_eq!(pair.key_size(), 1024);
    assert_eq!(pair.record().e(), Some(&[0x01, 0x00, 0x01][..]));
    assert!(fields(pair.record()).iter().all(Option::is_some));
    assert_eq!(pair.comment(), None);
}

#[test]
fn pkcs1_der_round_trip() {
    let pair = decode(KeyFormat::Pkcs1Der, DER);
    assert_eq!(&pair.to_pkcs1_der().unwrap()[..], DER);
}

#[test]
fn pkcs1_der_matches_independent_parser() {
    fn strip(field: Option<&[u8]>) -> &[u8] {
        let field = field.unwrap();
        let zeros = field.iter().take_while(|b| **b == 0).count();
        &field[zeros..]
    }

    let pair = decode(KeyFormat::OpenSshV1, OPENSSH);
    let der = pair.to_pkcs1_der().unwrap();
    let parsed = pkcs1::RsaPrivateKey::try_from(der.as_slice()).unwrap();
    let record = pair.record();

    assert_eq!(parsed.version(), pkcs1::Version::TwoPrime);
    assert_eq!(parsed.modulus.as_bytes(), strip(record.n()));
    assert_eq!(parsed.public_exponent.as_bytes(), strip(record.e()));
    assert_eq!(parsed.private_exponent.as_bytes(), strip(record.d()));
    assert_eq!(parsed.prime1.as_bytes(), strip(record.p()));
    assert_eq!(parsed.prime2.as_bytes(), strip(record.q()));
    assert_eq!(parsed.exponent1.as_bytes(), strip(record.dp()));
    assert_eq!(parsed.exponent2.as_bytes(), strip(record.dq()));
    assert_eq!(parsed.coefficient.as_bytes(), strip(record.qinv()));
}

#[test]
fn every_format_yields_the_same_key() {
    let expected = fields(decode(KeyFormat::Pkcs1Der, DER).record());

    assert_eq!(fields(putty_pair().record()), expected);
    assert_eq!(fields(decode(KeyFormat::FSecure, FSECURE).record()), expected);
    assert_eq!(fields(decode(KeyFormat::OpenSshV1, OPENSSH).record()), expected);
    assert_eq!(
        fields(RsaKeyPair::from_agent(registry(), AGENT).unwrap().record()),
        expected
    );
}

#[test]
fn putty_to_pkcs1_end_to_end() {
    let pair = putty_pair();
    assert_eq!(pair.format(), Some(KeyFormat::PuttyV2));
    assert_eq!(pair.key_size(), 1024);
    let derived = fields(pair.record());

    let der = pair.to_pkcs1_der().unwrap();
    assert_eq!(&der[..], DER);

    let reloaded = decode(KeyFormat::Pkcs1Der, &der);
    assert_eq!(fields(reloaded.record()), derived);
}

#[test]
fn putty_v3_reads_like_v2() {
    let mut pair = RsaKeyPair::from_public_key_blob(registry(), PUBLIC).unwrap();
    pair.decode(KeyFormat::PuttyV3, PUTTY).unwrap();
    assert_eq!(fields(pair.record()), fields(putty_pair().record()));
}

#[test]
fn putty_without_public_half_cannot_export() {
    let pair = decode(KeyFormat::PuttyV2, PUTTY);
    assert!(pair.record().dp().is_some());
    assert_eq!(pair.to_pkcs1_der(), Err(Error::MissingField("n")));
    assert_eq!(pair.key_size(), rsa_keyfile::DEFAULT_KEY_SIZE);
}

#[test]
fn fsecure_rejects_der_framing() {
    let mut pair = RsaKeyPair::new(registry());
    assert_eq!(
        pair.decode(KeyFormat::FSecure, DER),
        Err(Error::MalformedEncoding)
    );
}

#[test]
fn openssh_v1_reads_comment() {
    let pair = decode(KeyFormat::OpenSshV1, OPENSSH);
    assert_eq!(pair.comment(), Some(COMMENT));
    assert_eq!(pair.key_size(), 1024);
}

#[test]
fn openssh_v1_checkint_mismatch() {
    let mut buf = OPENSSH.to_vec();
    buf[..4].copy_from_slice(&0x1122_3344u32.to_be_bytes());
    buf[4..8].copy_from_slice(&0x5566_7788u32.to_be_bytes());

    let mut pair = RsaKeyPair::new(registry());
    assert_eq!(
        pair.decode(KeyFormat::OpenSshV1, &buf),
        Err(Error::IntegrityCheckFailed)
    );
    assert!(fields(pair.record()).iter().all(Option::is_none));
    assert_eq!(pair.format(), None);
}

#[test]
fn openssh_v1_private_blob_export() {
    let pair = decode(KeyFormat::Pkcs1Der, DER);
    let blob = pair.to_openssh_v1_private_blob().unwrap();

    // everything between the check integers and the comment
    let comment_start = 519 - (4 + COMMENT.len());
    assert_eq!(&blob[..], &OPENSSH[8..comment_start]);
}

#[test]
fn agent_round_trip() {
    let pair = RsaKeyPair::from_agent(registry(), AGENT).unwrap();
    assert_eq!(pair.format(), Some(KeyFormat::OpenSshAgent));
    assert_eq!(pair.comment(), Some(COMMENT));
    assert_eq!(&pair.to_agent().unwrap()[..], AGENT);
}

#[test]
fn agent_export_after_der_import() {
    let mut pair = decode(KeyFormat::Pkcs1Der, DER);
    pair.set_comment(COMMENT);
    assert_eq!(&pair.to_agent().unwrap()[..], AGENT);
}

#[test]
fn agent_rejects_other_key_types() {
    let mut buf = AGENT.to_vec();
    buf[4..11].copy_from_slice(b"ssh-dss");
    assert_eq!(
        RsaKeyPair::from_agent(registry(), &buf).unwrap_err(),
        Error::MalformedEncoding
    );
}

#[test]
fn agent_export_of_encrypted_key() {
    let pair = RsaKeyPair::encrypted(registry(), KeyFormat::Pkcs1Der, DER.to_vec());
    assert!(pair.is_encrypted());
    assert_eq!(pair.to_agent(), Err(Error::IsEncrypted));
    assert_eq!(pair.to_openssh_v1_private_blob(), Err(Error::IsEncrypted));
}

#[test]
fn decrypt_encrypted_putty_key() {
    let ciphertext = PUTTY.iter().map(|b| b ^ 0x5a).collect();
    let mut pair = RsaKeyPair::from_public_key_blob(registry(), PUBLIC).unwrap();
    pair.set_encrypted(KeyFormat::PuttyV3, ciphertext);
    assert!(pair.to_pkcs1_der().is_err());

    // wrong passphrase: the plaintext does not parse
    let err = pair
        .decrypt(|ciphertext| Ok(Zeroizing::new(ciphertext.to_vec())))
        .unwrap_err();
    assert!(err.is_malformed());
    assert!(pair.is_encrypted());

    pair.decrypt(|ciphertext| Ok(Zeroizing::new(ciphertext.iter().map(|b| b ^ 0x5a).collect())))
        .unwrap();
    assert!(!pair.is_encrypted());
    assert_eq!(pair.format(), Some(KeyFormat::PuttyV3));
    assert_eq!(&pair.to_pkcs1_der().unwrap()[..], DER);
}

#[test]
fn public_key_blob() {
    let pair = RsaKeyPair::from_public_key_blob(registry(), PUBLIC).unwrap();
    assert_eq!(pair.public_key_blob().as_deref(), Some(PUBLIC));
    assert_eq!(pair.key_size(), 1024);
    assert_eq!(pair.key_type_name(), "ssh-rsa");

    // synthesised from e and n
    let pair = decode(KeyFormat::Pkcs1Der, DER);
    assert_eq!(pair.public_key_blob().as_deref(), Some(PUBLIC));
}

#[test]
fn dispose_wipes_private_fields() {
    let mut pair = RsaKeyPair::from_agent(registry(), AGENT).unwrap();
    pair.dispose();

    let record = pair.record();
    assert!(!record.is_private());
    assert!(record.p().is_none());
    assert!(record.q().is_none());
    assert!(record.dp().is_none());
    assert!(record.dq().is_none());
    assert!(record.qinv().is_none());
    assert_eq!(record.comment(), None);

    assert_eq!(pair.public_key_blob().as_deref(), Some(PUBLIC));
    assert_eq!(pair.to_agent(), Err(Error::MissingField("d")));
}
