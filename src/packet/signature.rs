use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};
use bytes::Buf;
use digest::DynDigest;

use crate::crypto::hash::HashAlgorithm;
use crate::crypto::public_key::PublicKeyAlgorithm;
use crate::errors::{ensure_eq, Result};
use crate::packet::PacketTrait;
use crate::parsing::BufParsing;
use crate::ser::Serialize;
use crate::types::{KeyId, Mpi, Tag};

/// Signature types.
/// Ref: <https://www.rfc-editor.org/rfc/rfc4880.html#section-5.2.1>
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum SignatureType {
    /// Signature over a binary document
    Binary = 0x00,
    /// Signature over a canonical text document
    Text = 0x01,
}

impl SignatureType {
    pub fn from_u8(v: u8) -> Result<Self> {
        match v {
            0x00 => Ok(Self::Binary),
            0x01 => Ok(Self::Text),
            _ => Err(crate::errors::format_err!(
                "unsupported signature type 0x{:02x}",
                v
            )),
        }
    }
}

/// Signature Packet, version 3 layout.
/// <https://www.rfc-editor.org/rfc/rfc4880.html#section-5.2.2>
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    typ: SignatureType,
    created: u32,
    key_id: KeyId,
    pub_algorithm: PublicKeyAlgorithm,
    hash_algorithm: HashAlgorithm,
    /// left 16 bits of the signed hash value
    signed_hash_value: [u8; 2],
    signature: Mpi,
}

impl Signature {
    pub fn new(
        typ: SignatureType,
        created: u32,
        key_id: KeyId,
        hash_algorithm: HashAlgorithm,
        signed_hash_value: [u8; 2],
        signature: Mpi,
    ) -> Self {
        Signature {
            typ,
            created,
            key_id,
            pub_algorithm: PublicKeyAlgorithm::RSA,
            hash_algorithm,
            signed_hash_value,
            signature,
        }
    }

    pub fn from_buf<B: Buf>(mut i: B) -> Result<Self> {
        let version = i.read_u8()?;
        ensure_eq!(version, 3, "unsupported signature version {}", version);
        let hashed_len = i.read_u8()?;
        ensure_eq!(hashed_len, 5, "invalid hashed material length {}", hashed_len);

        let typ = SignatureType::from_u8(i.read_u8()?)?;
        let created = i.read_be_u32()?;
        let key_id = KeyId::from_slice(&i.read_array::<8>()?)?;
        let pub_algorithm = PublicKeyAlgorithm::from_u8(i.read_u8()?)?;
        let hash_algorithm = HashAlgorithm::from_u8(i.read_u8()?)?;
        let signed_hash_value = i.read_array::<2>()?;
        let signature = Mpi::from_buf(&mut i)?;

        Ok(Signature {
            typ,
            created,
            key_id,
            pub_algorithm,
            hash_algorithm,
            signed_hash_value,
            signature,
        })
    }

    pub fn typ(&self) -> SignatureType {
        self.typ
    }

    pub fn created(&self) -> u32 {
        self.created
    }

    pub fn key_id(&self) -> KeyId {
        self.key_id
    }

    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash_algorithm
    }

    pub fn signed_hash_value(&self) -> [u8; 2] {
        self.signed_hash_value
    }

    pub fn signature(&self) -> &Mpi {
        &self.signature
    }

    /// Feeds the hashed trailer (type and creation time) into a running
    /// hasher. The v3 layout hashes exactly these five octets after the
    /// document itself.
    pub fn hash_trailer(hasher: &mut Box<dyn DynDigest>, typ: SignatureType, created: u32) {
        let mut trailer = [0u8; 5];
        trailer[0] = typ as u8;
        trailer[1..].copy_from_slice(&created.to_be_bytes());
        hasher.update(&trailer);
    }
}

impl Serialize for Signature {
    fn to_writer<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(&[3, 5, self.typ as u8])?;
        w.write_u32::<BigEndian>(self.created)?;
        w.write_all(self.key_id.as_ref())?;
        w.write_all(&[self.pub_algorithm.into(), self.hash_algorithm.into()])?;
        w.write_all(&self.signed_hash_value)?;
        self.signature.to_writer(w)?;

        Ok(())
    }

    fn write_len(&self) -> usize {
        3 + 4 + 8 + 2 + 2 + self.signature.write_len()
    }
}

impl PacketTrait for Signature {
    fn tag(&self) -> Tag {
        Tag::Signature
    }
}
