use std::io::{self, Write};

use crate::packet::header::{encode_length, PacketHeader};
use crate::types::{PacketLength, Tag};

const CHUNK_SIZE: usize = 512;

/// Writes a single packet body of unknown size, emitting partial body
/// length chunks of [`CHUNK_SIZE`] and a final fixed length chunk.
/// Bodies that fit into one chunk become a plain fixed length packet.
pub struct PacketBodyWriter<W: Write> {
    inner: W,
    tag: Tag,
    buffer: Vec<u8>,
    wrote_partial: bool,
    finished: bool,
}

impl<W: Write> PacketBodyWriter<W> {
    pub fn new(tag: Tag, inner: W) -> Self {
        PacketBodyWriter {
            inner,
            tag,
            buffer: Vec::with_capacity(CHUNK_SIZE),
            wrote_partial: false,
            finished: false,
        }
    }

    fn emit_partial_chunk(&mut self) -> io::Result<()> {
        debug_assert_eq!(self.buffer.len(), CHUNK_SIZE);

        if !self.wrote_partial {
            PacketHeader::encode(
                self.tag,
                PacketLength::Partial(CHUNK_SIZE as u32),
                &mut self.inner,
            )
            .map_err(into_io)?;
            self.wrote_partial = true;
        } else {
            encode_length(PacketLength::Partial(CHUNK_SIZE as u32), &mut self.inner)
                .map_err(into_io)?;
        }

        self.inner.write_all(&self.buffer)?;
        self.buffer.clear();

        Ok(())
    }

    /// Flushes the final chunk and closes the packet.
    /// Must be called exactly once; dropping without finishing loses the
    /// tail of the body.
    pub fn finish(mut self) -> io::Result<W> {
        debug_assert!(!self.finished);

        let len = PacketLength::Fixed(self.buffer.len() as u32);
        if !self.wrote_partial {
            PacketHeader::encode(self.tag, len, &mut self.inner).map_err(into_io)?;
        } else {
            encode_length(len, &mut self.inner).map_err(into_io)?;
        }
        self.inner.write_all(&self.buffer)?;
        self.finished = true;

        Ok(self.inner)
    }
}

impl<W: Write> Write for PacketBodyWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut rest = buf;
        while !rest.is_empty() {
            let take = rest.len().min(CHUNK_SIZE - self.buffer.len());
            self.buffer.extend_from_slice(&rest[..take]);
            rest = &rest[take..];

            if self.buffer.len() == CHUNK_SIZE {
                self.emit_partial_chunk()?;
            }
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

fn into_io(err: crate::errors::Error) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;
    use crate::packet::reader::PacketBodyReader;

    fn round_trip(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        let mut w = PacketBodyWriter::new(Tag::LiteralData, &mut out);
        // write in awkward chunk sizes on purpose
        for chunk in data.chunks(97) {
            w.write_all(chunk).unwrap();
        }
        w.finish().unwrap();

        let mut cursor = &out[..];
        let header = PacketHeader::from_reader(&mut cursor).unwrap();
        assert_eq!(header.tag().unwrap(), Tag::LiteralData);

        let mut body = Vec::new();
        PacketBodyReader::new(header, cursor)
            .read_to_end(&mut body)
            .unwrap();
        body
    }

    #[test]
    fn small_bodies_use_fixed_lengths() {
        let data = vec![0xabu8; 100];
        assert_eq!(round_trip(&data), data);
    }

    #[test]
    fn large_bodies_use_partial_lengths() {
        let data: Vec<u8> = (0..100_000u32).map(|i| i as u8).collect();
        assert_eq!(round_trip(&data), data);
    }

    #[test]
    fn chunk_aligned_bodies() {
        // exactly one chunk: final fixed length is zero
        let data = vec![7u8; 512];
        assert_eq!(round_trip(&data), data);

        let data = vec![7u8; 1024];
        assert_eq!(round_trip(&data), data);
    }
}
