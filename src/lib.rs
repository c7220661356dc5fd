//! # pgplite
//!
//! Confidentiality and authenticity for discrete data objects, built on
//! a compatible subset of the OpenPGP message format (RFC 4880): RSA
//! key pairs, hybrid encryption for multiple recipients, and one-pass
//! streaming signatures.
//!
//! ```no_run
//! use pgplite::composed::{decrypt_bytes, encrypt_bytes, generate_key_pair};
//!
//! # fn main() -> pgplite::errors::Result<()> {
//! let alice = generate_key_pair("secret")?;
//! let bob = generate_key_pair("hunter2")?;
//!
//! let mut rng = rand::thread_rng();
//! let msg = encrypt_bytes(&mut rng, b"hello", &[alice.public_key(), bob.public_key()])?;
//!
//! let plain = decrypt_bytes(&msg, bob.secret_key(), "hunter2")?;
//! assert_eq!(plain, b"hello");
//! # Ok(())
//! # }
//! ```

pub mod armor;
pub mod composed;
pub mod crypto;
pub mod errors;
pub mod packet;
pub mod ser;
pub mod types;

mod parsing;
mod util;

pub use crate::composed::{
    decrypt, decrypt_bytes, encrypt, encrypt_bytes, generate_key_pair, sign, verify, verify_bytes,
    verify_to_bytes, verify_to_writer, KeyPair, Keyring, VerificationOutcome,
    DEFAULT_BIT_STRENGTH,
};
pub use crate::errors::{Error, Result};
pub use crate::packet::{PublicKey, SecretKey};
pub use crate::types::KeyId;
