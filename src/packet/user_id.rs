use std::io::Write;

use bytes::Buf;

use crate::errors::Result;
use crate::packet::PacketTrait;
use crate::parsing::BufParsing;
use crate::ser::Serialize;
use crate::types::Tag;

/// User ID Packet
/// <https://www.rfc-editor.org/rfc/rfc4880.html#section-5.11>
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId {
    id: String,
}

impl UserId {
    pub fn new(id: String) -> Self {
        UserId { id }
    }

    pub fn from_buf<B: Buf>(mut i: B) -> Result<Self> {
        let raw = i.rest();
        let id = std::str::from_utf8(&raw)?.to_string();
        Ok(UserId { id })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn into_string(self) -> String {
        self.id
    }
}

impl Serialize for UserId {
    fn to_writer<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(self.id.as_bytes())?;
        Ok(())
    }

    fn write_len(&self) -> usize {
        self.id.len()
    }
}

impl PacketTrait for UserId {
    fn tag(&self) -> Tag {
        Tag::UserId
    }
}
