use chrono::Utc;
use rand::{CryptoRng, Rng};

use crate::crypto::rsa;
use crate::errors::Result;
use crate::packet::{PublicKey, SecretKey, UnlockedSecretKey};
use crate::types::KeyId;

/// Key size policy applied by [`generate_key_pair`].
pub const DEFAULT_BIT_STRENGTH: usize = 1024;

/// An RSA key pair: the public half plus the passphrase protected
/// secret half.
#[derive(Debug, Clone)]
pub struct KeyPair {
    public: PublicKey,
    secret: SecretKey,
}

impl KeyPair {
    /// Generates a fresh pair and immediately protects the secret half
    /// under `passphrase`. An empty passphrase goes through the same
    /// encoding path.
    pub fn generate<R: Rng + CryptoRng>(
        rng: &mut R,
        bit_strength: usize,
        passphrase: &str,
        user_id: Option<String>,
    ) -> Result<Self> {
        let key = rsa::generate_key(rng, bit_strength)?;
        let created_at = Utc::now().timestamp() as u32;
        let secret = SecretKey::protect(rng, &key, created_at, passphrase, user_id)?;
        let public = secret.public_key().clone();

        Ok(KeyPair { public, secret })
    }

    pub fn from_parts(public: PublicKey, secret: SecretKey) -> Self {
        KeyPair { public, secret }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret
    }

    pub fn key_id(&self) -> KeyId {
        self.public.key_id()
    }

    pub fn export_public(&self) -> Result<Vec<u8>> {
        self.public.to_bytes()
    }

    pub fn export_secret(&self) -> Result<Vec<u8>> {
        self.secret.to_bytes()
    }

    pub fn unlock(&self, passphrase: &str) -> Result<UnlockedSecretKey> {
        self.secret.unlock(passphrase)
    }
}

/// Generates a key pair under the default policy.
pub fn generate_key_pair(passphrase: &str) -> Result<KeyPair> {
    KeyPair::generate(
        &mut rand::thread_rng(),
        DEFAULT_BIT_STRENGTH,
        passphrase,
        None,
    )
}
