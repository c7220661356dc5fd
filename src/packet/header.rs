use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::errors::{bail, ensure, Error, Result};
use crate::types::{PacketLength, Tag};

/// Maximum size of a partial packet length chunk.
const MAX_PARTIAL_LEN: u32 = 2u32.pow(30);

/// A parsed packet header. The tag is kept raw so that unknown kinds can
/// still be skipped over by their declared length.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PacketHeader {
    raw_tag: u8,
    length: PacketLength,
}

impl PacketHeader {
    /// Parse a single packet header, new or old format.
    pub fn from_reader<R: Read>(mut i: R) -> Result<Self> {
        let header = i.read_u8()?;

        let first_two_bits = header & 0b1100_0000;
        match first_two_bits {
            0b1100_0000 => {
                // new format, tag in the low six bits
                let raw_tag = header & 0b0011_1111;
                let length = read_new_length(&mut i)?;
                Ok(PacketHeader { raw_tag, length })
            }
            0b1000_0000 => {
                // old format, tag in bits 2..=5, length type in the low two
                let raw_tag = (header & 0b0011_1100) >> 2;
                let length = match header & 0b0000_0011 {
                    0 => PacketLength::Fixed(i.read_u8()?.into()),
                    1 => PacketLength::Fixed(i.read_u16::<BigEndian>()?.into()),
                    2 => PacketLength::Fixed(i.read_u32::<BigEndian>()?),
                    3 => PacketLength::Indeterminate,
                    _ => unreachable!("old packet length type is only 2 bits"),
                };
                Ok(PacketHeader { raw_tag, length })
            }
            _ => {
                bail!("invalid packet header bits {:b}", header);
            }
        }
    }

    /// The packet kind, or `UnknownPacketKind` for tags outside the
    /// supported closed set.
    pub fn tag(&self) -> Result<Tag> {
        Tag::try_from(self.raw_tag).map_err(|_| Error::UnknownPacketKind { tag: self.raw_tag })
    }

    pub fn raw_tag(&self) -> u8 {
        self.raw_tag
    }

    pub fn length(&self) -> PacketLength {
        self.length
    }

    /// Writes a new format header for the given tag and length.
    pub fn encode<W: Write>(tag: Tag, length: PacketLength, writer: &mut W) -> Result<()> {
        writer.write_u8(0b1100_0000 | u8::from(tag))?;
        encode_length(length, writer)
    }
}

/// Reads a new format body length. Also used for the continuation
/// lengths inside a partial body.
pub(crate) fn read_new_length<R: Read>(mut i: R) -> Result<PacketLength> {
    let olen = i.read_u8()?;
    let length = match olen {
        // One-Octet Lengths
        0..=191 => PacketLength::Fixed(olen.into()),
        // Two-Octet Lengths
        192..=223 => {
            let a = i.read_u8()?;
            PacketLength::Fixed(((u32::from(olen) - 192) << 8) + 192 + u32::from(a))
        }
        // Partial Body Lengths
        224..=254 => PacketLength::Partial(1u32 << (olen & 0x1F)),
        // Five-Octet Lengths
        255 => PacketLength::Fixed(i.read_u32::<BigEndian>()?),
    };

    Ok(length)
}

/// Writes a new format body length.
pub(crate) fn encode_length<W: Write>(length: PacketLength, writer: &mut W) -> Result<()> {
    match length {
        PacketLength::Fixed(len) => {
            if len < 192 {
                writer.write_u8(len as u8)?;
            } else if len < 8384 {
                let len = len - 192;
                writer.write_u8(((len >> 8) as u8) + 192)?;
                writer.write_u8(len as u8)?;
            } else {
                writer.write_u8(255)?;
                writer.write_u32::<BigEndian>(len)?;
            }
        }
        PacketLength::Partial(len) => {
            ensure!(len.count_ones() == 1, "partial length must be a power of two");
            ensure!(
                (512..=MAX_PARTIAL_LEN).contains(&len),
                "partial length out of range: {}",
                len
            );
            writer.write_u8(0b1110_0000 | (len.trailing_zeros() as u8))?;
        }
        PacketLength::Indeterminate => {
            bail!("indeterminate lengths are only supported in old format headers");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(tag: Tag, length: PacketLength) -> PacketHeader {
        let mut buf = Vec::new();
        PacketHeader::encode(tag, length, &mut buf).unwrap();
        PacketHeader::from_reader(&buf[..]).unwrap()
    }

    #[test]
    fn new_format_fixed_lengths() {
        for len in [0u32, 1, 191, 192, 8383, 8384, 70_000] {
            let header = round_trip(Tag::LiteralData, PacketLength::Fixed(len));
            assert_eq!(header.tag().unwrap(), Tag::LiteralData);
            assert_eq!(header.length(), PacketLength::Fixed(len));
        }
    }

    #[test]
    fn partial_lengths() {
        for len in [512u32, 1024, 1 << 20] {
            let header = round_trip(Tag::CompressedData, PacketLength::Partial(len));
            assert_eq!(header.length(), PacketLength::Partial(len));
        }

        let mut buf = Vec::new();
        assert!(PacketHeader::encode(Tag::LiteralData, PacketLength::Partial(300), &mut buf).is_err());
    }

    #[test]
    fn old_format_headers_are_accepted() {
        // old format, tag 11, one-octet length 5
        let raw = [0b1000_0000 | (11 << 2), 5u8];
        let header = PacketHeader::from_reader(&raw[..]).unwrap();
        assert_eq!(header.tag().unwrap(), Tag::LiteralData);
        assert_eq!(header.length(), PacketLength::Fixed(5));
    }

    #[test]
    fn unknown_tags_are_reported() {
        let mut buf = Vec::new();
        buf.push(0b1100_0000 | 17);
        buf.push(0);
        let header = PacketHeader::from_reader(&buf[..]).unwrap();
        assert!(matches!(
            header.tag(),
            Err(Error::UnknownPacketKind { tag: 17 })
        ));
    }
}
