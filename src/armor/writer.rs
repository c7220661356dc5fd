use std::hash::Hasher;
use std::io::{self, Write};

use base64::engine::{general_purpose, Engine as _};
use crc24::Crc24Hasher;

use crate::armor::BlockType;

/// Raw bytes per armor line; encodes to 64 base64 characters.
const BYTES_PER_LINE: usize = 48;

/// Streaming armor encoder. Emits the begin line on construction, then
/// base64 body lines as enough input accumulates, and the checksum plus
/// end line on [`finalize`](ArmorWriter::finalize).
pub struct ArmorWriter<W: Write> {
    inner: W,
    typ: BlockType,
    buffer: Vec<u8>,
    crc: Crc24Hasher,
}

impl<W: Write> ArmorWriter<W> {
    pub fn new(mut inner: W, typ: BlockType) -> io::Result<Self> {
        inner.write_all(b"-----BEGIN ")?;
        inner.write_all(typ.as_str().as_bytes())?;
        inner.write_all(b"-----\n\n")?;

        Ok(ArmorWriter {
            inner,
            typ,
            buffer: Vec::with_capacity(BYTES_PER_LINE),
            crc: Crc24Hasher::new(),
        })
    }

    fn write_line(&mut self, raw: &[u8]) -> io::Result<()> {
        let encoded = general_purpose::STANDARD.encode(raw);
        self.inner.write_all(encoded.as_bytes())?;
        self.inner.write_all(b"\n")
    }

    /// Flushes the partial last line, the crc24 checksum and the end
    /// line, returning the underlying writer.
    pub fn finalize(mut self) -> io::Result<W> {
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            self.write_line(&rest)?;
        }

        let crc = self.crc.finish() as u32;
        let crc_buf = [(crc >> 16) as u8, (crc >> 8) as u8, crc as u8];
        self.inner.write_all(b"=")?;
        self.inner
            .write_all(general_purpose::STANDARD.encode(crc_buf).as_bytes())?;
        self.inner.write_all(b"\n-----END ")?;
        self.inner.write_all(self.typ.as_str().as_bytes())?;
        self.inner.write_all(b"-----\n")?;
        self.inner.flush()?;

        Ok(self.inner)
    }
}

impl<W: Write> Write for ArmorWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.crc.write(buf);
        self.buffer.extend_from_slice(buf);

        while self.buffer.len() >= BYTES_PER_LINE {
            let rest = self.buffer.split_off(BYTES_PER_LINE);
            let line = std::mem::replace(&mut self.buffer, rest);
            self.write_line(&line)?;
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_message() {
        let mut w = ArmorWriter::new(Vec::new(), BlockType::Message).unwrap();
        w.write_all(b"hello world").unwrap();
        let out = String::from_utf8(w.finalize().unwrap()).unwrap();

        assert!(out.starts_with("-----BEGIN PGP MESSAGE-----\n\n"));
        assert!(out.contains("aGVsbG8gd29ybGQ=\n"));
        assert!(out.ends_with("-----END PGP MESSAGE-----\n"));
    }

    #[test]
    fn long_body_wraps_at_64_chars() {
        let mut w = ArmorWriter::new(Vec::new(), BlockType::PublicKey).unwrap();
        w.write_all(&[0x42; 200]).unwrap();
        let out = String::from_utf8(w.finalize().unwrap()).unwrap();

        let body: Vec<&str> = out
            .lines()
            .filter(|l| !l.is_empty() && !l.starts_with('-') && !l.starts_with('='))
            .collect();
        assert!(body.len() > 1);
        for line in &body[..body.len() - 1] {
            assert_eq!(line.len(), 64);
        }
    }
}
