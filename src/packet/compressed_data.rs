use std::io::{Read, Write};

use byteorder::WriteBytesExt;
use bytes::{Buf, Bytes};
use flate2::read::ZlibDecoder;

use crate::errors::{Error, Result};
use crate::packet::PacketTrait;
use crate::parsing::BufParsing;
use crate::ser::Serialize;
use crate::types::Tag;

/// Compression algorithm octet.
/// Ref: <https://www.rfc-editor.org/rfc/rfc4880.html#section-9.3>
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[repr(u8)]
pub enum CompressionAlgorithm {
    Uncompressed = 0,
    ZLIB = 2,
}

impl CompressionAlgorithm {
    pub fn from_u8(v: u8) -> Result<Self> {
        match v {
            0 => Ok(Self::Uncompressed),
            2 => Ok(Self::ZLIB),
            _ => Err(Error::Message {
                message: format!("unsupported compression algorithm {}", v),
            }),
        }
    }
}

/// Compressed Data Packet, in its buffered form. The signing and
/// verification paths never build this, they stream through the
/// compressor instead.
/// <https://www.rfc-editor.org/rfc/rfc4880.html#section-5.6>
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedData {
    algorithm: CompressionAlgorithm,
    compressed_data: Bytes,
}

impl CompressedData {
    pub fn from_buf<B: Buf>(mut i: B) -> Result<Self> {
        let algorithm = CompressionAlgorithm::from_u8(i.read_u8()?)?;
        let compressed_data = i.rest();

        Ok(CompressedData {
            algorithm,
            compressed_data,
        })
    }

    pub fn algorithm(&self) -> CompressionAlgorithm {
        self.algorithm
    }

    /// Decompresses the body into memory.
    pub fn decompress(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        match self.algorithm {
            CompressionAlgorithm::Uncompressed => {
                out.extend_from_slice(&self.compressed_data);
            }
            CompressionAlgorithm::ZLIB => {
                ZlibDecoder::new(&self.compressed_data[..]).read_to_end(&mut out)?;
            }
        }

        Ok(out)
    }
}

impl Serialize for CompressedData {
    fn to_writer<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_u8(self.algorithm as u8)?;
        w.write_all(&self.compressed_data)?;

        Ok(())
    }

    fn write_len(&self) -> usize {
        1 + self.compressed_data.len()
    }
}

impl PacketTrait for CompressedData {
    fn tag(&self) -> Tag {
        Tag::CompressedData
    }
}
