use std::io::Write;

use bytes::Buf;

use crate::crypto::hash::HashAlgorithm;
use crate::crypto::public_key::PublicKeyAlgorithm;
use crate::errors::{ensure_eq, Result};
use crate::packet::signature::SignatureType;
use crate::packet::PacketTrait;
use crate::parsing::BufParsing;
use crate::ser::Serialize;
use crate::types::{KeyId, Tag};

/// One-Pass Signature Packet: declares, ahead of the signed data, which
/// algorithm and signer the trailing signature packet will confirm.
/// <https://www.rfc-editor.org/rfc/rfc4880.html#section-5.4>
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnePassSignature {
    typ: SignatureType,
    hash_algorithm: HashAlgorithm,
    pub_algorithm: PublicKeyAlgorithm,
    key_id: KeyId,
    is_nested: bool,
}

impl OnePassSignature {
    pub fn new(typ: SignatureType, hash_algorithm: HashAlgorithm, key_id: KeyId) -> Self {
        OnePassSignature {
            typ,
            hash_algorithm,
            pub_algorithm: PublicKeyAlgorithm::RSA,
            key_id,
            is_nested: false,
        }
    }

    pub fn from_buf<B: Buf>(mut i: B) -> Result<Self> {
        let version = i.read_u8()?;
        ensure_eq!(version, 3, "unsupported one pass signature version {}", version);

        let typ = SignatureType::from_u8(i.read_u8()?)?;
        let hash_algorithm = HashAlgorithm::from_u8(i.read_u8()?)?;
        let pub_algorithm = PublicKeyAlgorithm::from_u8(i.read_u8()?)?;
        let key_id = KeyId::from_slice(&i.read_array::<8>()?)?;
        // zero means another one pass signature packet follows
        let is_nested = i.read_u8()? == 0;

        Ok(OnePassSignature {
            typ,
            hash_algorithm,
            pub_algorithm,
            key_id,
            is_nested,
        })
    }

    pub fn typ(&self) -> SignatureType {
        self.typ
    }

    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash_algorithm
    }

    pub fn key_id(&self) -> KeyId {
        self.key_id
    }
}

impl Serialize for OnePassSignature {
    fn to_writer<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(&[
            3,
            self.typ as u8,
            self.hash_algorithm.into(),
            self.pub_algorithm.into(),
        ])?;
        w.write_all(self.key_id.as_ref())?;
        // a one means this is the last signature over the nested data
        w.write_all(&[u8::from(!self.is_nested)])?;

        Ok(())
    }

    fn write_len(&self) -> usize {
        4 + 8 + 1
    }
}

impl PacketTrait for OnePassSignature {
    fn tag(&self) -> Tag {
        Tag::OnePassSignature
    }
}
