use std::collections::BTreeMap;
use std::hash::Hasher;
use std::io::{self, BufRead, Read};

use base64::engine::{general_purpose, Engine as _};
use crc24::Crc24Hasher;

use crate::armor::BlockType;
use crate::errors::{Error, Result};

/// Streaming armor decoder. Consumes the begin line and any armor
/// headers on construction; the `Read` impl then yields the decoded
/// body, verifying the crc24 checksum and the end line on the way out.
pub struct Dearmor<R: BufRead> {
    inner: R,
    typ: BlockType,
    headers: BTreeMap<String, String>,
    decoded: Vec<u8>,
    offset: usize,
    crc: Crc24Hasher,
    pending_line: Option<String>,
    done: bool,
}

impl<R: BufRead> Dearmor<R> {
    pub fn new(mut inner: R) -> Result<Self> {
        let typ = loop {
            let line = read_trimmed_line(&mut inner)?.ok_or(Error::InvalidArmorWrappers)?;
            if let Some(rest) = line.strip_prefix("-----BEGIN ") {
                let name = rest.strip_suffix("-----").ok_or(Error::InvalidArmorWrappers)?;
                break BlockType::from_str(name)?;
            }
        };

        let mut headers = BTreeMap::new();
        let mut pending_line = None;
        loop {
            let line = read_trimmed_line(&mut inner)?.ok_or(Error::InvalidArmorWrappers)?;
            if line.is_empty() {
                break;
            }
            match line.split_once(": ") {
                Some((key, value)) => {
                    headers.insert(key.to_string(), value.to_string());
                }
                None => {
                    // no blank separator line, this is already body data
                    pending_line = Some(line);
                    break;
                }
            }
        }

        Ok(Dearmor {
            inner,
            typ,
            headers,
            decoded: Vec::new(),
            offset: 0,
            crc: Crc24Hasher::new(),
            pending_line,
            done: false,
        })
    }

    pub fn typ(&self) -> BlockType {
        self.typ
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    fn next_line(&mut self) -> io::Result<Option<String>> {
        if let Some(line) = self.pending_line.take() {
            return Ok(Some(line));
        }
        read_trimmed_line(&mut self.inner).map_err(into_io)
    }

    fn expect_end_line(&mut self, line: &str) -> io::Result<()> {
        let expected = format!("-----END {}-----", self.typ.as_str());
        if line != expected {
            return Err(into_io(Error::InvalidArmorWrappers));
        }
        self.done = true;
        Ok(())
    }

    /// Decodes the next body line into the internal buffer. Returns
    /// false once the end of the block has been reached.
    fn refill(&mut self) -> io::Result<bool> {
        loop {
            let line = match self.next_line()? {
                Some(line) => line,
                None => return Err(into_io(Error::InvalidArmorWrappers)),
            };
            if line.is_empty() {
                continue;
            }

            if let Some(encoded_crc) = line.strip_prefix('=') {
                let raw = general_purpose::STANDARD
                    .decode(encoded_crc)
                    .map_err(|err| into_io(err.into()))?;
                let actual = (self.crc.finish() as u32) & 0xff_ffff;
                let expected = raw
                    .iter()
                    .fold(0u32, |acc, &octet| (acc << 8) | u32::from(octet));
                if raw.len() != 3 || actual != expected {
                    return Err(into_io(Error::InvalidChecksum));
                }

                let end = match self.next_line()? {
                    Some(line) => line,
                    None => return Err(into_io(Error::InvalidArmorWrappers)),
                };
                self.expect_end_line(&end)?;
                return Ok(false);
            }

            if line.starts_with("-----END") {
                self.expect_end_line(&line)?;
                return Ok(false);
            }

            let raw = general_purpose::STANDARD
                .decode(&line)
                .map_err(|err| into_io(err.into()))?;
            self.crc.write(&raw);
            self.decoded = raw;
            self.offset = 0;
            return Ok(true);
        }
    }
}

impl<R: BufRead> Read for Dearmor<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        while self.offset == self.decoded.len() {
            if self.done || !self.refill()? {
                return Ok(0);
            }
        }

        let available = &self.decoded[self.offset..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.offset += n;

        Ok(n)
    }
}

fn read_trimmed_line<R: BufRead>(reader: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }

    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn into_io(err: Error) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::armor::ArmorWriter;
    use std::io::Write;

    fn armor(data: &[u8], typ: BlockType) -> String {
        let mut w = ArmorWriter::new(Vec::new(), typ).unwrap();
        w.write_all(data).unwrap();
        String::from_utf8(w.finalize().unwrap()).unwrap()
    }

    #[test]
    fn round_trip() {
        let data: Vec<u8> = (0u8..=255).cycle().take(1000).collect();
        let armored = armor(&data, BlockType::Message);

        let mut dearmor = Dearmor::new(armored.as_bytes()).unwrap();
        assert_eq!(dearmor.typ(), BlockType::Message);
        let mut out = Vec::new();
        dearmor.read_to_end(&mut out).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn corrupted_checksum_is_rejected() {
        let mut armored = armor(b"some payload", BlockType::Message);
        let pos = armored.find("\n=").unwrap() + 2;
        let replacement = if &armored[pos..pos + 1] == "A" { "B" } else { "A" };
        armored.replace_range(pos..pos + 1, replacement);

        let mut dearmor = Dearmor::new(armored.as_bytes()).unwrap();
        let mut out = Vec::new();
        let err = dearmor.read_to_end(&mut out).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn mismatched_end_line_is_rejected() {
        let armored = armor(b"abc", BlockType::Message)
            .replace("-----END PGP MESSAGE-----", "-----END PGP SIGNATURE-----");

        let mut dearmor = Dearmor::new(armored.as_bytes()).unwrap();
        let mut out = Vec::new();
        assert!(dearmor.read_to_end(&mut out).is_err());
    }

    #[test]
    fn garbage_before_begin_is_skipped() {
        let armored = format!("some mail text\n\n{}", armor(b"xyz", BlockType::Signature));
        let mut dearmor = Dearmor::new(armored.as_bytes()).unwrap();
        assert_eq!(dearmor.typ(), BlockType::Signature);
        let mut out = Vec::new();
        dearmor.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"xyz");
    }
}
