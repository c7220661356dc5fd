use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use bytes::{Buf, Bytes};

use crate::errors::{ensure, Result};
use crate::packet::PacketTrait;
use crate::parsing::BufParsing;
use crate::ser::Serialize;
use crate::types::Tag;

/// Literal Data Packet
/// <https://www.rfc-editor.org/rfc/rfc4880.html#section-5.9>
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralData {
    header: LiteralDataHeader,
    data: Bytes,
}

/// The fields preceding the data: mode, file name and modification time.
/// Split out so the streaming paths can emit and parse them without
/// materializing the data itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralDataHeader {
    pub mode: DataMode,
    pub file_name: String,
    pub mtime: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum DataMode {
    Binary = b'b',
    Text = b't',
}

impl DataMode {
    fn from_u8(v: u8) -> Result<Self> {
        match v {
            b'b' => Ok(Self::Binary),
            b't' => Ok(Self::Text),
            _ => Err(crate::errors::format_err!("unsupported data mode {}", v)),
        }
    }
}

impl LiteralDataHeader {
    pub fn new_binary(file_name: impl Into<String>, mtime: u32) -> Result<Self> {
        let file_name = file_name.into();
        ensure!(file_name.len() <= 255, "file name too long");

        Ok(LiteralDataHeader {
            mode: DataMode::Binary,
            file_name,
            mtime,
        })
    }

    pub fn to_writer<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_u8(self.mode as u8)?;
        w.write_u8(self.file_name.len() as u8)?;
        w.write_all(self.file_name.as_bytes())?;
        w.write_u32::<BigEndian>(self.mtime)?;

        Ok(())
    }

    pub fn write_len(&self) -> usize {
        1 + 1 + self.file_name.len() + 4
    }

    /// Reads the header fields from a streaming body.
    pub fn from_reader<R: Read>(mut r: R) -> Result<Self> {
        let mode = DataMode::from_u8(r.read_u8()?)?;
        let name_len = r.read_u8()?;
        let mut name = vec![0u8; name_len as usize];
        r.read_exact(&mut name)?;
        let file_name = std::str::from_utf8(&name)?.to_string();
        let mtime = r.read_u32::<BigEndian>()?;

        Ok(LiteralDataHeader {
            mode,
            file_name,
            mtime,
        })
    }
}

impl LiteralData {
    pub fn new_binary(file_name: impl Into<String>, mtime: u32, data: Bytes) -> Result<Self> {
        Ok(LiteralData {
            header: LiteralDataHeader::new_binary(file_name, mtime)?,
            data,
        })
    }

    pub fn from_buf<B: Buf>(mut i: B) -> Result<Self> {
        let mode = DataMode::from_u8(i.read_u8()?)?;
        let name_len = i.read_u8()?;
        let name = i.read_take(name_len as usize)?;
        let file_name = std::str::from_utf8(&name)?.to_string();
        let mtime = i.read_be_u32()?;
        let data = i.rest();

        Ok(LiteralData {
            header: LiteralDataHeader {
                mode,
                file_name,
                mtime,
            },
            data,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.header.file_name
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl Serialize for LiteralData {
    fn to_writer<W: Write>(&self, w: &mut W) -> Result<()> {
        self.header.to_writer(w)?;
        w.write_all(&self.data)?;

        Ok(())
    }

    fn write_len(&self) -> usize {
        self.header.write_len() + self.data.len()
    }
}

impl PacketTrait for LiteralData {
    fn tag(&self) -> Tag {
        Tag::LiteralData
    }
}
