use std::io::Write;

use bytes::Buf;

use crate::errors::Result;
use crate::packet::{
    CompressedData, LiteralData, OnePassSignature, PacketTrait, PublicKey,
    PublicKeyEncryptedSessionKey, SecretKey, Signature, SymEncryptedData, UserId,
};
use crate::ser::Serialize;
use crate::types::Tag;

/// Sum type over all packet kinds this crate understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    PublicKeyEncryptedSessionKey(PublicKeyEncryptedSessionKey),
    Signature(Signature),
    OnePassSignature(OnePassSignature),
    SecretKey(SecretKey),
    PublicKey(PublicKey),
    CompressedData(CompressedData),
    SymEncryptedData(SymEncryptedData),
    LiteralData(LiteralData),
    UserId(UserId),
}

impl Packet {
    pub(crate) fn from_buf<B: Buf>(tag: Tag, i: B) -> Result<Self> {
        let packet = match tag {
            Tag::PublicKeyEncryptedSessionKey => {
                Packet::PublicKeyEncryptedSessionKey(PublicKeyEncryptedSessionKey::from_buf(i)?)
            }
            Tag::Signature => Packet::Signature(Signature::from_buf(i)?),
            Tag::OnePassSignature => Packet::OnePassSignature(OnePassSignature::from_buf(i)?),
            Tag::SecretKey => Packet::SecretKey(SecretKey::from_buf(i)?),
            Tag::PublicKey => Packet::PublicKey(PublicKey::from_buf(i)?),
            Tag::CompressedData => Packet::CompressedData(CompressedData::from_buf(i)?),
            Tag::SymEncryptedData => Packet::SymEncryptedData(SymEncryptedData::from_buf(i)?),
            Tag::LiteralData => Packet::LiteralData(LiteralData::from_buf(i)?),
            Tag::UserId => Packet::UserId(UserId::from_buf(i)?),
        };

        Ok(packet)
    }
}

impl Serialize for Packet {
    fn to_writer<W: Write>(&self, w: &mut W) -> Result<()> {
        match self {
            Packet::PublicKeyEncryptedSessionKey(p) => p.to_writer(w),
            Packet::Signature(p) => p.to_writer(w),
            Packet::OnePassSignature(p) => p.to_writer(w),
            Packet::SecretKey(p) => p.to_writer(w),
            Packet::PublicKey(p) => p.to_writer(w),
            Packet::CompressedData(p) => p.to_writer(w),
            Packet::SymEncryptedData(p) => p.to_writer(w),
            Packet::LiteralData(p) => p.to_writer(w),
            Packet::UserId(p) => p.to_writer(w),
        }
    }

    fn write_len(&self) -> usize {
        match self {
            Packet::PublicKeyEncryptedSessionKey(p) => p.write_len(),
            Packet::Signature(p) => p.write_len(),
            Packet::OnePassSignature(p) => p.write_len(),
            Packet::SecretKey(p) => p.write_len(),
            Packet::PublicKey(p) => p.write_len(),
            Packet::CompressedData(p) => p.write_len(),
            Packet::SymEncryptedData(p) => p.write_len(),
            Packet::LiteralData(p) => p.write_len(),
            Packet::UserId(p) => p.write_len(),
        }
    }
}

impl PacketTrait for Packet {
    fn tag(&self) -> Tag {
        match self {
            Packet::PublicKeyEncryptedSessionKey(_) => Tag::PublicKeyEncryptedSessionKey,
            Packet::Signature(_) => Tag::Signature,
            Packet::OnePassSignature(_) => Tag::OnePassSignature,
            Packet::SecretKey(_) => Tag::SecretKey,
            Packet::PublicKey(_) => Tag::PublicKey,
            Packet::CompressedData(_) => Tag::CompressedData,
            Packet::SymEncryptedData(_) => Tag::SymEncryptedData,
            Packet::LiteralData(_) => Tag::LiteralData,
            Packet::UserId(_) => Tag::UserId,
        }
    }
}
