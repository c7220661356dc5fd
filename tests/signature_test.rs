use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use pgplite::composed::{
    encrypt_bytes, generate_key_pair, sign, verify, verify_bytes, verify_to_bytes,
    verify_to_writer, Keyring, OnePassSigner,
};
use pgplite::errors::Error;
use pgplite::packet::{write_packet, CompressionAlgorithm, LiteralData, PacketBodyWriter};
use pgplite::types::Tag;
use pretty_assertions::assert_eq;
use rand::{RngCore, SeedableRng};
use rand_xorshift::XorShiftRng;

#[test]
fn sign_verify_round_trip() {
    let _ = pretty_env_logger::try_init();

    let pair = generate_key_pair("pass").unwrap();
    let plain = b"signed content";

    let msg = sign(
        &plain[..],
        "file.txt",
        1700000000,
        pair.secret_key(),
        "pass",
        false,
        Vec::new(),
    )
    .unwrap();

    let keyring = Keyring::from(pair.public_key().clone());
    let outcome = verify(&msg[..], &keyring).unwrap();

    assert!(outcome.valid);
    assert_eq!(outcome.data, plain);
    assert_eq!(outcome.file_name, "file.txt");
}

#[test]
fn armored_output_verifies() {
    let _ = pretty_env_logger::try_init();

    let pair = generate_key_pair("pass").unwrap();
    let plain = b"armored payload";

    let msg = sign(
        &plain[..],
        "a.txt",
        0,
        pair.secret_key(),
        "pass",
        true,
        Vec::new(),
    )
    .unwrap();

    let text = String::from_utf8(msg.clone()).unwrap();
    assert!(text.starts_with("-----BEGIN PGP MESSAGE-----"));
    assert!(text.trim_end().ends_with("-----END PGP MESSAGE-----"));

    let keyring = Keyring::from(pair.public_key().clone());
    let outcome = verify(&msg[..], &keyring).unwrap();
    assert!(outcome.valid);
    assert_eq!(outcome.data, plain);
}

#[test]
fn unknown_signer_is_strict_error_and_legacy_false() {
    let _ = pretty_env_logger::try_init();

    let signer = generate_key_pair("pass").unwrap();
    let other = generate_key_pair("other").unwrap();

    let msg = sign(
        &b"content"[..],
        "f",
        0,
        signer.secret_key(),
        "pass",
        false,
        Vec::new(),
    )
    .unwrap();

    let keyring = Keyring::from(other.public_key().clone());
    let err = verify(&msg[..], &keyring).unwrap_err();
    assert!(matches!(err, Error::UnknownSigner { .. }));

    assert!(!verify_bytes(&msg, &keyring));
    assert!(verify_to_bytes(&msg, &keyring).is_none());
}

#[test]
fn mismatching_signature_is_a_negative_result() {
    let _ = pretty_env_logger::try_init();

    let pair = generate_key_pair("pass").unwrap();

    // hand-build a message whose trailing signature covers different
    // bytes than the literal data it carries
    let mut signer = OnePassSigner::new(pair.secret_key(), "pass").unwrap();

    let mut compressed = PacketBodyWriter::new(Tag::CompressedData, Vec::new());
    compressed
        .write_all(&[CompressionAlgorithm::ZLIB as u8])
        .unwrap();
    let mut zlib = ZlibEncoder::new(compressed, Compression::default());

    signer.emit_one_pass(&mut zlib).unwrap();
    let literal = LiteralData::new_binary("f", 0, (&b"transmitted"[..]).into()).unwrap();
    write_packet(&mut zlib, &literal).unwrap();

    signer.update(b"actually signed").unwrap();
    signer.finalize(&mut zlib).unwrap();

    let msg = zlib.finish().unwrap().finish().unwrap();

    let keyring = Keyring::from(pair.public_key().clone());
    let outcome = verify(&msg[..], &keyring).unwrap();
    assert!(!outcome.valid);
    assert_eq!(outcome.data, b"transmitted");
}

#[test]
fn invalid_signature_leaves_sink_untouched() {
    let _ = pretty_env_logger::try_init();

    let pair = generate_key_pair("pass").unwrap();
    let other = generate_key_pair("other").unwrap();

    let msg = sign(
        &b"content"[..],
        "f",
        0,
        pair.secret_key(),
        "pass",
        false,
        Vec::new(),
    )
    .unwrap();

    let mut sink = Vec::new();
    let keyring = Keyring::from(pair.public_key().clone());
    assert!(verify_to_writer(&msg[..], &keyring, &mut sink).unwrap());
    assert_eq!(sink, b"content");

    let mut sink = Vec::new();
    let keyring = Keyring::from(other.public_key().clone());
    assert!(verify_to_writer(&msg[..], &keyring, &mut sink).is_err());
    assert!(sink.is_empty());
}

#[test]
fn signer_rejects_out_of_order_calls() {
    let _ = pretty_env_logger::try_init();

    let pair = generate_key_pair("pass").unwrap();

    let mut signer = OnePassSigner::new(pair.secret_key(), "pass").unwrap();
    assert!(signer.update(b"too early").is_err());

    let mut out = Vec::new();
    signer.emit_one_pass(&mut out).unwrap();
    assert!(signer.emit_one_pass(&mut out).is_err());

    signer.update(b"data").unwrap();
    signer.finalize(&mut out).unwrap();
    assert!(signer.update(b"too late").is_err());
    assert!(signer.finalize(&mut out).is_err());
}

#[test]
fn wrong_passphrase_fails_key_unlock() {
    let _ = pretty_env_logger::try_init();

    let pair = generate_key_pair("pass").unwrap();

    let err = sign(
        &b"content"[..],
        "f",
        0,
        pair.secret_key(),
        "nope",
        false,
        Vec::new(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::KeyUnlock { .. }));
}

#[test]
fn streams_large_inputs() {
    let _ = pretty_env_logger::try_init();

    let mut data_rng = XorShiftRng::seed_from_u64(0xdead);
    let mut plain = vec![0u8; 200 * 1024];
    data_rng.fill_bytes(&mut plain);

    let pair = generate_key_pair("pass").unwrap();
    let msg = sign(
        &plain[..],
        "big.bin",
        0,
        pair.secret_key(),
        "pass",
        false,
        Vec::new(),
    )
    .unwrap();

    let keyring = Keyring::from(pair.public_key().clone());
    let outcome = verify(&msg[..], &keyring).unwrap();
    assert!(outcome.valid);
    assert_eq!(outcome.data, plain);
}

#[test]
fn encrypt_then_sign_scenario() {
    let _ = pretty_env_logger::try_init();
    let mut rng = rand::thread_rng();

    let passphrase = "1234567890";
    let payload = b"1234567890";

    let a = generate_key_pair(passphrase).unwrap();
    let b = generate_key_pair(passphrase).unwrap();
    let c = generate_key_pair(passphrase).unwrap();

    let encrypted =
        encrypt_bytes(&mut rng, payload, &[a.public_key(), b.public_key()]).unwrap();

    let via_a = pgplite::composed::decrypt_bytes(&encrypted, a.secret_key(), passphrase).unwrap();
    let via_b = pgplite::composed::decrypt_bytes(&encrypted, b.secret_key(), passphrase).unwrap();
    assert_eq!(via_a, payload);
    assert_eq!(via_b, payload);

    let signed = sign(
        &encrypted[..],
        "blob",
        0,
        a.secret_key(),
        passphrase,
        false,
        Vec::new(),
    )
    .unwrap();

    assert!(verify_bytes(&signed, &Keyring::from(a.public_key().clone())));
    assert!(!verify_bytes(&signed, &Keyring::from(c.public_key().clone())));
}
