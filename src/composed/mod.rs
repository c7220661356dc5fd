mod key_pair;
mod message;
mod sign;

pub use self::key_pair::{generate_key_pair, KeyPair, DEFAULT_BIT_STRENGTH};
pub use self::message::{decrypt, decrypt_bytes, encrypt, encrypt_bytes};
pub use self::sign::{
    sign, verify, verify_bytes, verify_to_bytes, verify_to_writer, Keyring, OnePassSigner,
    VerificationOutcome,
};
