use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};
use bytes::Buf;
use rand::{CryptoRng, Rng};
use zeroize::Zeroizing;

use crate::crypto::checksum;
use crate::crypto::public_key::PublicKeyAlgorithm;
use crate::crypto::sym::{SessionKey, SymmetricKeyAlgorithm};
use crate::errors::{ensure_eq, Result};
use crate::packet::{PacketTrait, PublicKey, UnlockedSecretKey};
use crate::parsing::BufParsing;
use crate::ser::Serialize;
use crate::types::{KeyId, Mpi, Tag};

/// Public-Key Encrypted Session Key Packet (version 3). One per
/// recipient; each wraps the same session key under a different key.
/// <https://www.rfc-editor.org/rfc/rfc4880.html#section-5.1>
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyEncryptedSessionKey {
    key_id: KeyId,
    algorithm: PublicKeyAlgorithm,
    mpi: Mpi,
}

impl PublicKeyEncryptedSessionKey {
    /// Wraps a session key for `recipient`. The encoded plaintext is the
    /// symmetric algorithm octet, the raw key, and a two octet simple
    /// checksum over the key.
    pub fn encrypt_session_key<R: Rng + CryptoRng>(
        rng: &mut R,
        recipient: &PublicKey,
        session_key: &SessionKey,
    ) -> Result<Self> {
        let key = session_key.as_bytes();
        let mut plain = Zeroizing::new(Vec::with_capacity(key.len() + 3));
        plain.push(session_key.algorithm() as u8);
        plain.extend_from_slice(key);
        plain.write_u16::<BigEndian>(checksum::calculate_simple(key))?;

        let mpi = recipient.encrypt(rng, &plain)?;

        Ok(PublicKeyEncryptedSessionKey {
            key_id: recipient.key_id(),
            algorithm: recipient.algorithm(),
            mpi,
        })
    }

    pub fn from_buf<B: Buf>(mut i: B) -> Result<Self> {
        let version = i.read_u8()?;
        ensure_eq!(version, 3, "unsupported pkesk version {}", version);

        let key_id = KeyId::from(i.read_array::<8>()?);
        let algorithm = PublicKeyAlgorithm::from_u8(i.read_u8()?)?;
        let mpi = Mpi::from_buf(&mut i)?;

        Ok(PublicKeyEncryptedSessionKey {
            key_id,
            algorithm,
            mpi,
        })
    }

    pub fn key_id(&self) -> KeyId {
        self.key_id
    }

    /// Recovers the session key using the matching secret key.
    pub fn unwrap_session_key(&self, key: &UnlockedSecretKey) -> Result<SessionKey> {
        let plain = Zeroizing::new(key.decrypt(&self.mpi)?);
        ensure_eq!(self.key_id, key.key_id(), "session key for a different key");

        let mut buf = &plain[..];
        let alg = SymmetricKeyAlgorithm::from_u8(buf.read_u8()?)?;
        let raw_key = buf.read_take(alg.key_size())?;
        let actual = buf.read_be_u16()?.to_be_bytes();
        checksum::simple(&actual, &raw_key)?;

        SessionKey::from_parts(alg, raw_key.to_vec())
    }
}

impl Serialize for PublicKeyEncryptedSessionKey {
    fn to_writer<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(&[3])?;
        w.write_all(self.key_id.as_ref())?;
        w.write_all(&[self.algorithm as u8])?;
        self.mpi.to_writer(w)?;

        Ok(())
    }

    fn write_len(&self) -> usize {
        10 + self.mpi.write_len()
    }
}

impl PacketTrait for PublicKeyEncryptedSessionKey {
    fn tag(&self) -> Tag {
        Tag::PublicKeyEncryptedSessionKey
    }
}
