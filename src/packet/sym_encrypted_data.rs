use std::io::Write;

use bytes::{Buf, Bytes};

use crate::errors::Result;
use crate::packet::PacketTrait;
use crate::parsing::BufParsing;
use crate::ser::Serialize;
use crate::types::Tag;

/// Symmetrically Encrypted Data Packet. Opaque at this layer; the
/// ciphertext starts with the block-size-plus-two quick check prefix and
/// decrypts to a literal data packet.
/// <https://www.rfc-editor.org/rfc/rfc4880.html#section-5.7>
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymEncryptedData {
    data: Bytes,
}

impl SymEncryptedData {
    pub fn from_buf<B: Buf>(mut i: B) -> Result<Self> {
        Ok(SymEncryptedData { data: i.rest() })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl Serialize for SymEncryptedData {
    fn to_writer<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(&self.data)?;
        Ok(())
    }

    fn write_len(&self) -> usize {
        self.data.len()
    }
}

impl PacketTrait for SymEncryptedData {
    fn tag(&self) -> Tag {
        Tag::SymEncryptedData
    }
}
