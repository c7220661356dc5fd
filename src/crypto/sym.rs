use std::io;

use aes::{Aes128, Aes192, Aes256};
use cfb_mode::cipher::KeyIvInit;
use cfb_mode::{BufDecryptor, BufEncryptor};
use rand::{CryptoRng, Rng};
use zeroize::Zeroizing;

use crate::errors::{ensure, Error, Result};
use crate::util::fill_buffer;

/// Available symmetric key algorithms.
/// Ref: <https://www.rfc-editor.org/rfc/rfc4880.html#section-9.2>
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
#[repr(u8)]
pub enum SymmetricKeyAlgorithm {
    /// AES with 128-bit key
    AES128 = 7,
    /// AES with 192-bit key
    AES192 = 8,
    /// AES with 256-bit key
    AES256 = 9,
}

impl Default for SymmetricKeyAlgorithm {
    fn default() -> Self {
        Self::AES128
    }
}

impl SymmetricKeyAlgorithm {
    pub fn from_u8(v: u8) -> Result<Self> {
        match v {
            7 => Ok(Self::AES128),
            8 => Ok(Self::AES192),
            9 => Ok(Self::AES256),
            _ => Err(Error::Message {
                message: format!("unsupported symmetric key algorithm {}", v),
            }),
        }
    }

    /// The size of a single block in bytes.
    pub fn block_size(self) -> usize {
        16
    }

    /// The size of the key in bytes.
    pub fn key_size(self) -> usize {
        match self {
            Self::AES128 => 16,
            Self::AES192 => 24,
            Self::AES256 => 32,
        }
    }
}

/// An ephemeral symmetric key. Generated fresh for every encryption
/// operation, wrapped once per recipient, zeroed on drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionKey {
    alg: SymmetricKeyAlgorithm,
    key: Zeroizing<Vec<u8>>,
}

impl SessionKey {
    pub fn generate<R: Rng + CryptoRng>(rng: &mut R, alg: SymmetricKeyAlgorithm) -> Self {
        let mut key = Zeroizing::new(vec![0u8; alg.key_size()]);
        rng.fill_bytes(&mut key);

        SessionKey { alg, key }
    }

    pub fn from_parts(alg: SymmetricKeyAlgorithm, key: Vec<u8>) -> Result<Self> {
        ensure!(
            key.len() == alg.key_size(),
            "invalid session key length {} for {:?}",
            key.len(),
            alg
        );

        Ok(SessionKey {
            alg,
            key: Zeroizing::new(key),
        })
    }

    pub fn algorithm(&self) -> SymmetricKeyAlgorithm {
        self.alg
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.key
    }
}

pub(crate) enum CfbEncryptor {
    Aes128(BufEncryptor<Aes128>),
    Aes192(BufEncryptor<Aes192>),
    Aes256(BufEncryptor<Aes256>),
}

impl CfbEncryptor {
    pub(crate) fn new(alg: SymmetricKeyAlgorithm, key: &[u8], iv: &[u8]) -> Result<Self> {
        match alg {
            SymmetricKeyAlgorithm::AES128 => {
                Ok(Self::Aes128(BufEncryptor::new_from_slices(key, iv)?))
            }
            SymmetricKeyAlgorithm::AES192 => {
                Ok(Self::Aes192(BufEncryptor::new_from_slices(key, iv)?))
            }
            SymmetricKeyAlgorithm::AES256 => {
                Ok(Self::Aes256(BufEncryptor::new_from_slices(key, iv)?))
            }
        }
    }

    pub(crate) fn encrypt(&mut self, buf: &mut [u8]) {
        match self {
            Self::Aes128(e) => e.encrypt(buf),
            Self::Aes192(e) => e.encrypt(buf),
            Self::Aes256(e) => e.encrypt(buf),
        }
    }
}

pub(crate) enum CfbDecryptor {
    Aes128(BufDecryptor<Aes128>),
    Aes192(BufDecryptor<Aes192>),
    Aes256(BufDecryptor<Aes256>),
}

impl CfbDecryptor {
    pub(crate) fn new(alg: SymmetricKeyAlgorithm, key: &[u8], iv: &[u8]) -> Result<Self> {
        match alg {
            SymmetricKeyAlgorithm::AES128 => {
                Ok(Self::Aes128(BufDecryptor::new_from_slices(key, iv)?))
            }
            SymmetricKeyAlgorithm::AES192 => {
                Ok(Self::Aes192(BufDecryptor::new_from_slices(key, iv)?))
            }
            SymmetricKeyAlgorithm::AES256 => {
                Ok(Self::Aes256(BufDecryptor::new_from_slices(key, iv)?))
            }
        }
    }

    pub(crate) fn decrypt(&mut self, buf: &mut [u8]) {
        match self {
            Self::Aes128(d) => d.decrypt(buf),
            Self::Aes192(d) => d.decrypt(buf),
            Self::Aes256(d) => d.decrypt(buf),
        }
    }
}

/// Plain CFB over a whole buffer, used for the protected secret key
/// material which carries its own explicit IV.
pub(crate) fn encrypt_with_iv(
    alg: SymmetricKeyAlgorithm,
    key: &[u8],
    iv: &[u8],
    data: &mut [u8],
) -> Result<()> {
    CfbEncryptor::new(alg, key, iv)?.encrypt(data);
    Ok(())
}

pub(crate) fn decrypt_with_iv(
    alg: SymmetricKeyAlgorithm,
    key: &[u8],
    iv: &[u8],
    data: &mut [u8],
) -> Result<()> {
    CfbDecryptor::new(alg, key, iv)?.decrypt(data);
    Ok(())
}

/// Streaming OpenPGP CFB encryption, `block_size + 2` byte prefix with
/// the repeated quick check bytes, then resynchronization.
/// Ref: <https://www.rfc-editor.org/rfc/rfc4880.html#section-13.9>
pub(crate) struct EncryptWriter<W: io::Write> {
    cipher: CfbEncryptor,
    inner: W,
    buf: Vec<u8>,
}

impl<W: io::Write> EncryptWriter<W> {
    pub(crate) fn new<R: Rng + CryptoRng>(
        rng: &mut R,
        session_key: &SessionKey,
        mut inner: W,
    ) -> Result<Self> {
        let alg = session_key.algorithm();
        let bs = alg.block_size();

        let mut prefix = Zeroizing::new(vec![0u8; bs + 2]);
        rng.fill_bytes(&mut prefix[..bs]);
        prefix[bs] = prefix[bs - 2];
        prefix[bs + 1] = prefix[bs - 1];

        let zero_iv = vec![0u8; bs];
        let mut cipher = CfbEncryptor::new(alg, session_key.as_bytes(), &zero_iv)?;
        cipher.encrypt(&mut prefix);

        // resync: the last `bs` bytes of the encrypted prefix become the iv
        let cipher = CfbEncryptor::new(alg, session_key.as_bytes(), &prefix[2..])?;
        inner.write_all(&prefix)?;

        Ok(EncryptWriter {
            cipher,
            inner,
            buf: Vec::with_capacity(512),
        })
    }

    pub(crate) fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: io::Write> io::Write for EncryptWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.clear();
        self.buf.extend_from_slice(buf);
        self.cipher.encrypt(&mut self.buf);
        self.inner.write_all(&self.buf)?;

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Streaming counterpart of [`EncryptWriter`]. Checks the quick check
/// bytes before yielding any plaintext.
pub(crate) struct DecryptReader<R: io::Read> {
    cipher: CfbDecryptor,
    inner: R,
}

impl<R: io::Read> DecryptReader<R> {
    pub(crate) fn new(session_key: &SessionKey, mut inner: R) -> Result<Self> {
        let alg = session_key.algorithm();
        let bs = alg.block_size();

        let mut prefix = Zeroizing::new(vec![0u8; bs + 2]);
        let n = fill_buffer(&mut inner, &mut prefix)?;
        ensure!(n == bs + 2, "encrypted data is too short");

        let resync_iv = prefix[2..].to_vec();
        let zero_iv = vec![0u8; bs];
        let mut cipher = CfbDecryptor::new(alg, session_key.as_bytes(), &zero_iv)?;
        cipher.decrypt(&mut prefix);

        ensure!(
            prefix[bs] == prefix[bs - 2] && prefix[bs + 1] == prefix[bs - 1],
            "quick check failed: wrong session key or corrupt data"
        );

        let cipher = CfbDecryptor::new(alg, session_key.as_bytes(), &resync_iv)?;

        Ok(DecryptReader { cipher, inner })
    }
}

impl<R: io::Read> io::Read for DecryptReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.cipher.decrypt(&mut buf[..n]);

        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};

    use super::*;

    #[test]
    fn stream_round_trip() {
        let mut rng = rand::thread_rng();
        for alg in [
            SymmetricKeyAlgorithm::AES128,
            SymmetricKeyAlgorithm::AES192,
            SymmetricKeyAlgorithm::AES256,
        ] {
            let key = SessionKey::generate(&mut rng, alg);
            let plain: Vec<u8> = (0..4096u32).map(|i| i as u8).collect();

            let mut ciphertext = Vec::new();
            let mut enc = EncryptWriter::new(&mut rng, &key, &mut ciphertext).unwrap();
            // uneven chunk sizes to exercise the streaming state
            for chunk in plain.chunks(37) {
                enc.write_all(chunk).unwrap();
            }
            drop(enc);

            assert_eq!(ciphertext.len(), plain.len() + alg.block_size() + 2);

            let mut dec = DecryptReader::new(&key, &ciphertext[..]).unwrap();
            let mut back = Vec::new();
            dec.read_to_end(&mut back).unwrap();
            assert_eq!(back, plain);
        }
    }

    #[test]
    fn wrong_key_fails_quick_check() {
        let mut rng = rand::thread_rng();
        let alg = SymmetricKeyAlgorithm::AES128;
        let key = SessionKey::generate(&mut rng, alg);

        let mut ciphertext = Vec::new();
        let mut enc = EncryptWriter::new(&mut rng, &key, &mut ciphertext).unwrap();
        enc.write_all(b"attack at dawn").unwrap();
        drop(enc);

        let other = SessionKey::generate(&mut rng, alg);
        assert!(DecryptReader::new(&other, &ciphertext[..]).is_err());
    }
}
