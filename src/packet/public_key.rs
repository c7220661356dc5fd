use std::io::{BufRead, BufReader, Write};

use byteorder::{BigEndian, WriteBytesExt};
use bytes::Buf;
use rand::{CryptoRng, Rng};
use sha1::{Digest, Sha1};

use crate::armor::{ArmorWriter, BlockType, Dearmor};
use crate::crypto::hash::HashAlgorithm;
use crate::crypto::public_key::PublicKeyAlgorithm;
use crate::crypto::rsa;
use crate::errors::{ensure_eq, Error, Result};
use crate::packet::user_id::UserId;
use crate::packet::{write_packet, Packet, PacketParser, PacketTrait};
use crate::parsing::BufParsing;
use crate::ser::Serialize;
use crate::types::{KeyId, Mpi, Tag};

/// Public-Key Packet: a version 4 RSA key.
/// <https://www.rfc-editor.org/rfc/rfc4880.html#section-5.5.2>
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    created_at: u32,
    algorithm: PublicKeyAlgorithm,
    n: Mpi,
    e: Mpi,
    /// Optional identity, serialized as a separate UserId packet on
    /// export, never part of the key packet body.
    user_id: Option<String>,
}

impl PublicKey {
    pub fn new(created_at: u32, n: Mpi, e: Mpi, user_id: Option<String>) -> Self {
        PublicKey {
            created_at,
            algorithm: PublicKeyAlgorithm::RSA,
            n,
            e,
            user_id,
        }
    }

    /// Parses the key packet body.
    pub fn from_buf<B: Buf>(mut i: B) -> Result<Self> {
        let version = i.read_u8()?;
        ensure_eq!(version, 4, "unsupported key version {}", version);
        let created_at = i.read_be_u32()?;
        let algorithm = PublicKeyAlgorithm::from_u8(i.read_u8()?)?;
        let n = Mpi::from_buf(&mut i)?;
        let e = Mpi::from_buf(&mut i)?;

        Ok(PublicKey {
            created_at,
            algorithm,
            n,
            e,
            user_id: None,
        })
    }

    /// Parses an exported public key: the key packet, optionally followed
    /// by a UserId packet.
    pub fn from_bytes<R: BufRead>(source: R) -> Result<Self> {
        let mut key = None;
        for packet in PacketParser::new(source) {
            match packet.map_err(malformed)? {
                Packet::PublicKey(pk) => {
                    if key.is_none() {
                        key = Some(pk);
                    }
                }
                Packet::UserId(id) => {
                    if let Some(ref mut key) = key {
                        if key.user_id.is_none() {
                            key.user_id = Some(id.into_string());
                        }
                    }
                }
                other => {
                    return Err(Error::MalformedKey {
                        message: format!("unexpected {:?} packet in public key", other.tag()),
                    });
                }
            }
        }

        key.ok_or(Error::MalformedKey {
            message: "no public key packet found".into(),
        })
    }

    /// Serializes the key packet plus, when present, the UserId packet.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.write_len() + 32);
        write_packet(&mut out, self)?;
        if let Some(ref id) = self.user_id {
            write_packet(&mut out, &UserId::new(id.clone()))?;
        }

        Ok(out)
    }

    /// Serializes the key into a `PGP PUBLIC KEY BLOCK`.
    pub fn to_armored_bytes(&self) -> Result<Vec<u8>> {
        let mut armor = ArmorWriter::new(Vec::new(), BlockType::PublicKey)?;
        armor.write_all(&self.to_bytes()?)?;

        Ok(armor.finalize()?)
    }

    /// Parses an armored public key block.
    pub fn from_armor<R: BufRead>(source: R) -> Result<Self> {
        let dearmor = Dearmor::new(source)?;
        if dearmor.typ() != BlockType::PublicKey {
            return Err(Error::MalformedKey {
                message: format!("expected a public key block, found {:?}", dearmor.typ()),
            });
        }

        Self::from_bytes(BufReader::new(dearmor))
    }

    /// SHA1 fingerprint over the v4 hash prefix and the key packet body.
    pub fn fingerprint(&self) -> Vec<u8> {
        let body = self
            .body_to_bytes()
            .expect("writing to a vec cannot fail");

        let mut hasher = Sha1::new();
        hasher.update([0x99]);
        hasher.update((body.len() as u16).to_be_bytes());
        hasher.update(&body);
        hasher.finalize().to_vec()
    }

    /// The low eight bytes of the fingerprint.
    pub fn key_id(&self) -> KeyId {
        let f = self.fingerprint();
        KeyId::from_slice(&f[f.len() - 8..]).expect("fingerprint is 20 bytes")
    }

    pub fn created_at(&self) -> u32 {
        self.created_at
    }

    pub fn algorithm(&self) -> PublicKeyAlgorithm {
        self.algorithm
    }

    pub fn n(&self) -> &Mpi {
        &self.n
    }

    pub fn e(&self) -> &Mpi {
        &self.e
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub(crate) fn set_user_id(&mut self, user_id: Option<String>) {
        self.user_id = user_id;
    }

    /// The bit length of the modulus.
    pub fn bit_strength(&self) -> usize {
        self.n.bit_size()
    }

    /// RSA keys can both encrypt and sign.
    pub fn is_encryption_key(&self) -> bool {
        matches!(self.algorithm, PublicKeyAlgorithm::RSA)
    }

    /// Asymmetrically wraps the given plaintext for this key.
    pub fn encrypt<R: Rng + CryptoRng>(&self, rng: &mut R, plain: &[u8]) -> Result<Mpi> {
        rsa::encrypt(rng, &self.n, &self.e, plain)
    }

    /// Checks the given signature against a finished digest.
    pub fn verify_signature(&self, hash: HashAlgorithm, digest: &[u8], sig: &Mpi) -> Result<()> {
        rsa::verify(&self.n, &self.e, hash, digest, sig)
    }

    fn body_to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.write_len());
        self.to_writer(&mut buf)?;
        Ok(buf)
    }
}

pub(crate) fn malformed(err: Error) -> Error {
    match err {
        err @ Error::MalformedKey { .. } => err,
        err => Error::MalformedKey {
            message: err.to_string(),
        },
    }
}

impl Serialize for PublicKey {
    fn to_writer<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_u8(4)?;
        w.write_u32::<BigEndian>(self.created_at)?;
        w.write_u8(self.algorithm.into())?;
        self.n.to_writer(w)?;
        self.e.to_writer(w)?;

        Ok(())
    }

    fn write_len(&self) -> usize {
        1 + 4 + 1 + self.n.write_len() + self.e.write_len()
    }
}

impl PacketTrait for PublicKey {
    fn tag(&self) -> Tag {
        Tag::PublicKey
    }
}
