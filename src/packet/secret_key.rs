use std::fmt;
use std::io::{BufRead, BufReader, Write};

use bytes::{Buf, Bytes};
use rand::{CryptoRng, Rng};
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::RsaPrivateKey;
use sha1::{Digest, Sha1};
use zeroize::Zeroizing;

use crate::armor::{ArmorWriter, BlockType, Dearmor};
use crate::crypto::hash::HashAlgorithm;
use crate::crypto::sym::SymmetricKeyAlgorithm;
use crate::crypto::{checksum, rsa as rsa_ops, sym};
use crate::errors::{Error, Result};
use crate::packet::public_key::malformed;
use crate::packet::user_id::UserId;
use crate::packet::{write_packet, Packet, PacketParser, PacketTrait, PublicKey};
use crate::parsing::BufParsing;
use crate::ser::Serialize;
use crate::types::{KeyId, Mpi, StringToKey, Tag};

/// S2K usage octet for encrypted secret material with a SHA1 integrity
/// check.
const S2K_USAGE_SHA1: u8 = 254;

/// Secret-Key Packet: the public key fields followed by the passphrase
/// protected secret material. The decrypted exponents never leave
/// [`unlock`](SecretKey::unlock) except inside an [`UnlockedSecretKey`],
/// which is dropped (and zeroed) at the end of the operation using it.
/// <https://www.rfc-editor.org/rfc/rfc4880.html#section-5.5.3>
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretKey {
    details: PublicKey,
    sym_alg: SymmetricKeyAlgorithm,
    s2k: StringToKey,
    iv: Vec<u8>,
    ciphertext: Bytes,
}

impl SecretKey {
    /// Protects a freshly generated RSA key under the given passphrase.
    /// An empty passphrase is allowed and uses the identical encoding.
    pub fn protect<R: Rng + CryptoRng>(
        rng: &mut R,
        key: &RsaPrivateKey,
        created_at: u32,
        passphrase: &str,
        user_id: Option<String>,
    ) -> Result<Self> {
        let details = PublicKey::new(created_at, key.n().into(), key.e().into(), user_id);

        let d: Mpi = key.d().into();
        let p: Mpi = (&key.primes()[0]).into();
        let q: Mpi = (&key.primes()[1]).into();
        let u: Mpi = rsa_ops::u_factor(&key.primes()[0], &key.primes()[1])?.into();

        let mut plain = Zeroizing::new(Vec::new());
        for mpi in [&d, &p, &q, &u] {
            mpi.to_writer(&mut *plain)?;
        }
        let digest = Sha1::digest(&plain);
        plain.extend_from_slice(&digest);

        let sym_alg = SymmetricKeyAlgorithm::AES128;
        let s2k = StringToKey::new_salted(rng);
        let derived = s2k.derive_key(passphrase, sym_alg.key_size())?;

        let mut iv = vec![0u8; sym_alg.block_size()];
        rng.fill_bytes(&mut iv);

        let mut ciphertext = plain.to_vec();
        sym::encrypt_with_iv(sym_alg, &derived, &iv, &mut ciphertext)?;

        Ok(SecretKey {
            details,
            sym_alg,
            s2k,
            iv,
            ciphertext: ciphertext.into(),
        })
    }

    pub fn from_buf<B: Buf>(mut i: B) -> Result<Self> {
        let details = PublicKey::from_buf(&mut i)?;

        let usage = i.read_u8()?;
        if usage != S2K_USAGE_SHA1 {
            return Err(Error::MalformedKey {
                message: format!("unsupported s2k usage {}", usage),
            });
        }
        let sym_alg = SymmetricKeyAlgorithm::from_u8(i.read_u8()?)?;
        let s2k = StringToKey::from_buf(&mut i)?;
        let iv = i.read_take(sym_alg.block_size())?.to_vec();
        let ciphertext = i.rest();

        Ok(SecretKey {
            details,
            sym_alg,
            s2k,
            iv,
            ciphertext,
        })
    }

    /// Parses an exported secret key: the key packet, optionally followed
    /// by a UserId packet.
    pub fn from_bytes<R: BufRead>(source: R) -> Result<Self> {
        let mut key: Option<SecretKey> = None;
        for packet in PacketParser::new(source) {
            match packet.map_err(malformed)? {
                Packet::SecretKey(sk) => {
                    if key.is_none() {
                        key = Some(sk);
                    }
                }
                Packet::UserId(id) => {
                    if let Some(ref mut key) = key {
                        if key.details.user_id().is_none() {
                            key.details.set_user_id(Some(id.into_string()));
                        }
                    }
                }
                other => {
                    return Err(Error::MalformedKey {
                        message: format!("unexpected {:?} packet in secret key", other.tag()),
                    });
                }
            }
        }

        key.ok_or(Error::MalformedKey {
            message: "no secret key packet found".into(),
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.write_len() + 32);
        write_packet(&mut out, self)?;
        if let Some(id) = self.details.user_id() {
            write_packet(&mut out, &UserId::new(id.to_string()))?;
        }

        Ok(out)
    }

    /// Serializes the key into a `PGP PRIVATE KEY BLOCK`.
    pub fn to_armored_bytes(&self) -> Result<Vec<u8>> {
        let mut armor = ArmorWriter::new(Vec::new(), BlockType::PrivateKey)?;
        armor.write_all(&self.to_bytes()?)?;

        Ok(armor.finalize()?)
    }

    /// Parses an armored private key block.
    pub fn from_armor<R: BufRead>(source: R) -> Result<Self> {
        let dearmor = Dearmor::new(source)?;
        if dearmor.typ() != BlockType::PrivateKey {
            return Err(Error::MalformedKey {
                message: format!("expected a private key block, found {:?}", dearmor.typ()),
            });
        }

        Self::from_bytes(BufReader::new(dearmor))
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.details
    }

    pub fn key_id(&self) -> KeyId {
        self.details.key_id()
    }

    /// Decrypts the secret material. The embedded SHA1 check makes a
    /// wrong passphrase deterministically distinguishable from corrupt
    /// key material.
    pub fn unlock(&self, passphrase: &str) -> Result<UnlockedSecretKey> {
        let derived = self.s2k.derive_key(passphrase, self.sym_alg.key_size())?;

        let mut plain = Zeroizing::new(self.ciphertext.to_vec());
        sym::decrypt_with_iv(self.sym_alg, &derived, &self.iv, &mut plain)?;

        if plain.len() < 20 {
            return Err(Error::MalformedKey {
                message: "secret material too short".into(),
            });
        }
        let (material, hash) = plain.split_at(plain.len() - 20);
        checksum::sha1(hash, material)?;

        // the checksum matched, anything wrong from here on is a broken key
        let mut buf = material;
        let d = Mpi::from_buf(&mut buf).map_err(malformed_key)?;
        let p = Mpi::from_buf(&mut buf).map_err(malformed_key)?;
        let q = Mpi::from_buf(&mut buf).map_err(malformed_key)?;
        let _u = Mpi::from_buf(&mut buf).map_err(malformed_key)?;

        let key = RsaPrivateKey::from_components(
            self.details.n().into(),
            self.details.e().into(),
            (&d).into(),
            vec![(&p).into(), (&q).into()],
        )
        .map_err(|err| Error::MalformedKey {
            message: err.to_string(),
        })?;

        Ok(UnlockedSecretKey {
            key,
            key_id: self.key_id(),
        })
    }
}

fn malformed_key(err: Error) -> Error {
    Error::MalformedKey {
        message: err.to_string(),
    }
}

impl Serialize for SecretKey {
    fn to_writer<W: Write>(&self, w: &mut W) -> Result<()> {
        self.details.to_writer(w)?;
        w.write_all(&[S2K_USAGE_SHA1, self.sym_alg as u8])?;
        self.s2k.to_writer(w)?;
        w.write_all(&self.iv)?;
        w.write_all(&self.ciphertext)?;

        Ok(())
    }

    fn write_len(&self) -> usize {
        self.details.write_len() + 2 + self.s2k.write_len() + self.iv.len() + self.ciphertext.len()
    }
}

impl PacketTrait for SecretKey {
    fn tag(&self) -> Tag {
        Tag::SecretKey
    }
}

/// The transient, decrypted form of a secret key. Confined to the scope
/// of a single sign or decrypt call; the inner RSA key zeroes itself on
/// drop.
pub struct UnlockedSecretKey {
    key: RsaPrivateKey,
    key_id: KeyId,
}

impl fmt::Debug for UnlockedSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnlockedSecretKey")
            .field("key", &"[..]")
            .field("key_id", &self.key_id)
            .finish()
    }
}

impl UnlockedSecretKey {
    pub fn key_id(&self) -> KeyId {
        self.key_id
    }

    /// Signs a finished digest.
    pub fn sign(&self, hash: HashAlgorithm, digest: &[u8]) -> Result<Mpi> {
        rsa_ops::sign(&self.key, hash, digest)
    }

    /// Unwraps an asymmetrically wrapped value.
    pub fn decrypt(&self, mpi: &Mpi) -> Result<Vec<u8>> {
        rsa_ops::decrypt(&self.key, mpi)
    }
}
