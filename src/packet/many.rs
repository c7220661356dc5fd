use std::io::BufRead;

use log::{debug, warn};

use crate::errors::{Error, Result};
use crate::packet::{Packet, PacketBodyReader, PacketHeader};

/// Iterator over the packets of a binary stream. Packets with unknown
/// tags are skipped over (their body is consumed) and reported as an
/// `Err` item, so a caller can keep iterating past them.
pub struct PacketParser<R> {
    reader: R,
    done: bool,
}

impl<R: BufRead> PacketParser<R> {
    pub fn new(reader: R) -> Self {
        PacketParser {
            reader,
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for PacketParser<R> {
    type Item = Result<Packet>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.reader.fill_buf() {
            Ok(buf) if buf.is_empty() => return None,
            Ok(_) => {}
            Err(err) => {
                self.done = true;
                return Some(Err(err.into()));
            }
        }

        let header = match PacketHeader::from_reader(&mut self.reader) {
            Ok(header) => header,
            Err(err) => {
                self.done = true;
                return Some(Err(err));
            }
        };
        debug!("packet header {:?}", header);

        let body = match PacketBodyReader::new(header, &mut self.reader).into_vec() {
            Ok(body) => body,
            Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => {
                self.done = true;
                return Some(Err(Error::TruncatedStream {
                    needed: 1,
                    remaining: 0,
                }));
            }
            Err(err) => {
                self.done = true;
                return Some(Err(err.into()));
            }
        };

        let tag = match header.tag() {
            Ok(tag) => tag,
            Err(err) => {
                // body already consumed, the stream stays aligned
                warn!("skipping unknown packet tag {}", header.raw_tag());
                return Some(Err(err));
            }
        };

        Some(Packet::from_buf(tag, &body[..]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::{write_packet, UserId};
    use std::io::Cursor;

    #[test]
    fn parses_consecutive_packets() {
        let mut buf = Vec::new();
        write_packet(&mut buf, &UserId::new("alice".into())).unwrap();
        write_packet(&mut buf, &UserId::new("bob".into())).unwrap();

        let packets: Vec<_> = PacketParser::new(Cursor::new(buf))
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(packets.len(), 2);
        match &packets[0] {
            Packet::UserId(id) => assert_eq!(id.id(), "alice"),
            other => panic!("unexpected packet {:?}", other),
        }
    }

    #[test]
    fn unknown_tag_is_skipped() {
        let mut buf = Vec::new();
        // new format header with tag 63, one byte of body
        buf.extend_from_slice(&[0b1111_1111, 1, 0xaa]);
        write_packet(&mut buf, &UserId::new("carol".into())).unwrap();

        let mut parser = PacketParser::new(Cursor::new(buf));
        assert!(matches!(
            parser.next(),
            Some(Err(Error::UnknownPacketKind { tag: 63 }))
        ));
        match parser.next() {
            Some(Ok(Packet::UserId(id))) => assert_eq!(id.id(), "carol"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(parser.next().is_none());
    }

    #[test]
    fn truncated_body_errors() {
        let buf = vec![0b1101_0011, 10, 1, 2];
        let mut parser = PacketParser::new(Cursor::new(buf));
        assert!(matches!(
            parser.next(),
            Some(Err(Error::TruncatedStream { .. }))
        ));
        assert!(parser.next().is_none());
    }
}
