use std::io::{self, Read};

use crate::packet::header::{read_new_length, PacketHeader};
use crate::types::PacketLength;

/// Reads a single packet body, transparently following partial body
/// length chunks. Forward-only: once consumed, the stream position is
/// past this packet.
pub struct PacketBodyReader<R: Read> {
    inner: R,
    /// bytes left in the current chunk
    remaining: u32,
    /// true when more length headers follow after the current chunk
    continued: bool,
    /// old format indeterminate body, read to EOF
    indeterminate: bool,
    done: bool,
}

impl<R: Read> PacketBodyReader<R> {
    pub fn new(header: PacketHeader, inner: R) -> Self {
        let (remaining, continued, indeterminate) = match header.length() {
            PacketLength::Fixed(n) => (n, false, false),
            PacketLength::Partial(n) => (n, true, false),
            PacketLength::Indeterminate => (0, false, true),
        };

        PacketBodyReader {
            inner,
            remaining,
            continued,
            indeterminate,
            done: false,
        }
    }

    /// Reads the whole remaining body into memory. Only sensible for the
    /// small, fixed size packet kinds.
    pub fn into_vec(mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.read_to_end(&mut buf)?;
        Ok(buf)
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for PacketBodyReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.indeterminate {
            return self.inner.read(buf);
        }

        while self.remaining == 0 {
            if self.done || !self.continued {
                return Ok(0);
            }
            // partial body: the next chunk starts with another length
            match read_new_length(&mut self.inner) {
                Ok(PacketLength::Fixed(n)) => {
                    self.remaining = n;
                    self.continued = false;
                    if n == 0 {
                        self.done = true;
                        return Ok(0);
                    }
                }
                Ok(PacketLength::Partial(n)) => {
                    self.remaining = n;
                }
                Ok(PacketLength::Indeterminate) => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "indeterminate continuation length",
                    ));
                }
                Err(err) => {
                    return Err(io::Error::new(io::ErrorKind::UnexpectedEof, err.to_string()));
                }
            }
        }

        let to_read = buf.len().min(self.remaining as usize);
        let n = self.inner.read(&mut buf[..to_read])?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "packet body ends before its declared length",
            ));
        }
        self.remaining -= n as u32;
        if self.remaining == 0 && !self.continued {
            self.done = true;
        }

        Ok(n)
    }
}
