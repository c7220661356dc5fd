//! # Packet module
//!
//! Lossless binary framing for the supported packet kinds, plus the
//! streaming body reader/writer used for bodies of unknown size.

mod header;
mod many;
mod packet_sum;
mod reader;
mod writer;

mod compressed_data;
mod literal_data;
mod one_pass_signature;
mod public_key;
mod public_key_encrypted_session_key;
mod secret_key;
mod signature;
mod sym_encrypted_data;
mod user_id;

use std::io;

pub use self::compressed_data::{CompressedData, CompressionAlgorithm};
pub use self::header::PacketHeader;
pub use self::literal_data::{DataMode, LiteralData, LiteralDataHeader};
pub use self::many::PacketParser;
pub use self::one_pass_signature::OnePassSignature;
pub use self::packet_sum::Packet;
pub use self::public_key::PublicKey;
pub use self::public_key_encrypted_session_key::PublicKeyEncryptedSessionKey;
pub use self::reader::PacketBodyReader;
pub use self::secret_key::{SecretKey, UnlockedSecretKey};
pub use self::signature::{Signature, SignatureType};
pub use self::sym_encrypted_data::SymEncryptedData;
pub use self::user_id::UserId;
pub use self::writer::PacketBodyWriter;

use crate::errors::Result;
use crate::ser::Serialize;
use crate::types::{PacketLength, Tag};

pub trait PacketTrait: Serialize {
    fn tag(&self) -> Tag;
}

impl<T: PacketTrait> PacketTrait for &T {
    fn tag(&self) -> Tag {
        (*self).tag()
    }
}

/// Writes a single packet with a fixed length header.
pub fn write_packet<W: io::Write>(writer: &mut W, packet: &impl PacketTrait) -> Result<()> {
    let len = packet.write_len();
    PacketHeader::encode(packet.tag(), PacketLength::Fixed(len as u32), writer)?;
    packet.to_writer(writer)
}
