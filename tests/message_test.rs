use pgplite::composed::{decrypt, decrypt_bytes, encrypt, encrypt_bytes, generate_key_pair};
use pgplite::errors::Error;
use pretty_assertions::assert_eq;
use rand::{RngCore, SeedableRng};
use rand_xorshift::XorShiftRng;

#[test]
fn encrypt_decrypt_round_trip() {
    let _ = pretty_env_logger::try_init();
    let mut rng = rand::thread_rng();

    let pair = generate_key_pair("pass").unwrap();
    let plain = b"the quick brown fox";

    let msg = encrypt_bytes(&mut rng, plain, &[pair.public_key()]).unwrap();
    assert_ne!(&msg[..], &plain[..]);

    let out = decrypt_bytes(&msg, pair.secret_key(), "pass").unwrap();
    assert_eq!(out, plain);
}

#[test]
fn every_recipient_can_decrypt() {
    let _ = pretty_env_logger::try_init();
    let mut rng = rand::thread_rng();

    let alice = generate_key_pair("a").unwrap();
    let bob = generate_key_pair("b").unwrap();
    let plain = b"for both of you";

    let msg = encrypt_bytes(&mut rng, plain, &[alice.public_key(), bob.public_key()]).unwrap();

    let from_alice = decrypt_bytes(&msg, alice.secret_key(), "a").unwrap();
    let from_bob = decrypt_bytes(&msg, bob.secret_key(), "b").unwrap();
    assert_eq!(from_alice, plain);
    assert_eq!(from_bob, from_alice);
}

#[test]
fn tampered_session_key_packet_does_not_affect_other_recipients() {
    let _ = pretty_env_logger::try_init();
    let mut rng = rand::thread_rng();

    let alice = generate_key_pair("a").unwrap();
    let bob = generate_key_pair("b").unwrap();
    let plain = b"still readable for bob";

    let mut msg = encrypt_bytes(&mut rng, plain, &[alice.public_key(), bob.public_key()]).unwrap();

    // the first packet wraps the session key for alice; flip a byte in
    // the middle of its encrypted mpi
    msg[30] ^= 0xff;

    assert!(decrypt_bytes(&msg, alice.secret_key(), "a").is_err());
    let from_bob = decrypt_bytes(&msg, bob.secret_key(), "b").unwrap();
    assert_eq!(from_bob, plain);
}

#[test]
fn no_recipients_is_an_error() {
    let _ = pretty_env_logger::try_init();
    let mut rng = rand::thread_rng();

    let err = encrypt_bytes(&mut rng, b"data", &[]).unwrap_err();
    assert!(matches!(err, Error::NoRecipients));
}

#[test]
fn missing_recipient_is_an_error() {
    let _ = pretty_env_logger::try_init();
    let mut rng = rand::thread_rng();

    let alice = generate_key_pair("a").unwrap();
    let carol = generate_key_pair("c").unwrap();

    let msg = encrypt_bytes(&mut rng, b"for alice only", &[alice.public_key()]).unwrap();

    let err = decrypt_bytes(&msg, carol.secret_key(), "c").unwrap_err();
    assert!(matches!(err, Error::NoMatchingRecipient));
}

#[test]
fn wrong_passphrase_blocks_decryption() {
    let _ = pretty_env_logger::try_init();
    let mut rng = rand::thread_rng();

    let pair = generate_key_pair("right").unwrap();
    let msg = encrypt_bytes(&mut rng, b"data", &[pair.public_key()]).unwrap();

    let err = decrypt_bytes(&msg, pair.secret_key(), "wrong").unwrap_err();
    assert!(matches!(err, Error::WrongPassphrase));
}

#[test]
fn streams_large_payloads() {
    let _ = pretty_env_logger::try_init();
    let mut rng = rand::thread_rng();

    let mut data_rng = XorShiftRng::seed_from_u64(0x1234);
    let mut plain = vec![0u8; 100 * 1024];
    data_rng.fill_bytes(&mut plain);

    let pair = generate_key_pair("pass").unwrap();

    let msg = encrypt(
        &mut rng,
        &plain[..],
        "big.bin",
        1700000000,
        &[pair.public_key()],
        Vec::new(),
    )
    .unwrap();

    let mut out = Vec::new();
    decrypt(&msg[..], pair.secret_key(), "pass", &mut out).unwrap();
    assert_eq!(out, plain);
}

#[test]
fn truncated_message_is_an_error() {
    let _ = pretty_env_logger::try_init();
    let mut rng = rand::thread_rng();

    let pair = generate_key_pair("pass").unwrap();
    let msg = encrypt_bytes(&mut rng, b"some data to cut short", &[pair.public_key()]).unwrap();

    let cut = &msg[..msg.len() / 2];
    assert!(decrypt_bytes(cut, pair.secret_key(), "pass").is_err());
}
