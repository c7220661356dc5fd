use std::io::{self, BufRead, BufReader, Read, Write};

use log::debug;
use rand::{CryptoRng, Rng};

use crate::crypto::sym::{DecryptReader, EncryptWriter, SessionKey, SymmetricKeyAlgorithm};
use crate::errors::{Error, Result};
use crate::packet::{
    write_packet, CompressionAlgorithm, LiteralDataHeader, PacketBodyReader, PacketBodyWriter,
    PacketHeader, PublicKey, PublicKeyEncryptedSessionKey, SecretKey,
};
use crate::types::Tag;

/// Encrypts `source` for every key in `recipients`.
///
/// A fresh session key is wrapped once per recipient, in caller order,
/// ahead of a single symmetrically encrypted data packet holding the
/// literal data. Any one matching secret key recovers the plaintext.
pub fn encrypt<R, S, W>(
    rng: &mut R,
    mut source: S,
    file_name: &str,
    mtime: u32,
    recipients: &[&PublicKey],
    sink: W,
) -> Result<W>
where
    R: Rng + CryptoRng,
    S: Read,
    W: Write,
{
    if recipients.is_empty() {
        return Err(Error::NoRecipients);
    }

    let session_key = SessionKey::generate(rng, SymmetricKeyAlgorithm::AES128);

    let mut sink = sink;
    for recipient in recipients {
        let pkesk =
            PublicKeyEncryptedSessionKey::encrypt_session_key(rng, recipient, &session_key)?;
        debug!("wrapped session key for {}", recipient.key_id());
        write_packet(&mut sink, &pkesk)?;
    }

    let body = PacketBodyWriter::new(Tag::SymEncryptedData, sink);
    let enc = EncryptWriter::new(rng, &session_key, body)?;

    let mut literal = PacketBodyWriter::new(Tag::LiteralData, enc);
    LiteralDataHeader::new_binary(file_name, mtime)?.to_writer(&mut literal)?;
    io::copy(&mut source, &mut literal)?;

    let enc = literal.finish()?;
    let body = enc.into_inner();
    let sink = body.finish()?;

    Ok(sink)
}

/// In-memory variant of [`encrypt`].
pub fn encrypt_bytes<R: Rng + CryptoRng>(
    rng: &mut R,
    data: &[u8],
    recipients: &[&PublicKey],
) -> Result<Vec<u8>> {
    encrypt(rng, data, "", 0, recipients, Vec::new())
}

/// Decrypts a message into `sink` using the given secret key.
///
/// Session key packets are matched against the key's id; decryption
/// uses whichever one matches, regardless of its position among the
/// recipients.
pub fn decrypt<S, W>(source: S, key: &SecretKey, passphrase: &str, sink: &mut W) -> Result<()>
where
    S: BufRead,
    W: Write,
{
    let mut source = source;
    let mut wrapped_keys = Vec::new();

    loop {
        if source.fill_buf()?.is_empty() {
            return Err(Error::Message {
                message: "no encrypted data packet found".into(),
            });
        }

        let header = PacketHeader::from_reader(&mut source)?;
        match header.tag()? {
            Tag::PublicKeyEncryptedSessionKey => {
                let body = PacketBodyReader::new(header, &mut source).into_vec()?;
                wrapped_keys.push(PublicKeyEncryptedSessionKey::from_buf(&body[..])?);
            }
            Tag::SymEncryptedData => {
                let body = PacketBodyReader::new(header, &mut source);
                return decrypt_data(body, &wrapped_keys, key, passphrase, sink);
            }
            tag => {
                return Err(Error::Message {
                    message: format!("unexpected {:?} packet in encrypted message", tag),
                });
            }
        }
    }
}

fn decrypt_data<S, W>(
    body: PacketBodyReader<S>,
    wrapped_keys: &[PublicKeyEncryptedSessionKey],
    key: &SecretKey,
    passphrase: &str,
    sink: &mut W,
) -> Result<()>
where
    S: Read,
    W: Write,
{
    let key_id = key.key_id();
    let pkesk = wrapped_keys
        .iter()
        .find(|p| p.key_id() == key_id)
        .ok_or(Error::NoMatchingRecipient)?;

    let unlocked = key.unlock(passphrase)?;
    let session_key = pkesk.unwrap_session_key(&unlocked)?;

    let mut inner = BufReader::new(DecryptReader::new(&session_key, body)?);

    let header = PacketHeader::from_reader(&mut inner)?;
    match header.tag()? {
        Tag::LiteralData => {
            copy_literal(PacketBodyReader::new(header, inner), sink)?;
        }
        // messages from other producers compress before encrypting
        Tag::CompressedData => {
            let mut body = PacketBodyReader::new(header, inner);
            let mut alg = [0u8; 1];
            body.read_exact(&mut alg)?;

            let decompressed: Box<dyn Read + '_> = match CompressionAlgorithm::from_u8(alg[0])? {
                CompressionAlgorithm::ZLIB => Box::new(flate2::read::ZlibDecoder::new(body)),
                CompressionAlgorithm::Uncompressed => Box::new(body),
            };
            let mut inner = BufReader::new(decompressed);

            let header = PacketHeader::from_reader(&mut inner)?;
            if header.tag()? != Tag::LiteralData {
                return Err(Error::Message {
                    message: format!("unexpected {:?} packet inside ciphertext", header.tag()?),
                });
            }
            copy_literal(PacketBodyReader::new(header, inner), sink)?;
        }
        tag => {
            return Err(Error::Message {
                message: format!("unexpected {:?} packet inside ciphertext", tag),
            });
        }
    }

    Ok(())
}

fn copy_literal<R: Read, W: Write>(mut literal: PacketBodyReader<R>, sink: &mut W) -> Result<()> {
    let _header = LiteralDataHeader::from_reader(&mut literal)?;
    io::copy(&mut literal, sink)?;

    Ok(())
}

/// In-memory variant of [`decrypt`].
pub fn decrypt_bytes(data: &[u8], key: &SecretKey, passphrase: &str) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    decrypt(data, key, passphrase, &mut out)?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use rand::thread_rng;

    use super::*;
    use crate::composed::KeyPair;
    use crate::packet::LiteralData;

    #[test]
    fn compressed_interior_decrypts() {
        let _ = pretty_env_logger::try_init();
        let mut rng = thread_rng();

        let pair = KeyPair::generate(&mut rng, 1024, "pass", None).unwrap();
        let session_key = SessionKey::generate(&mut rng, SymmetricKeyAlgorithm::AES128);

        let mut msg = Vec::new();
        let pkesk = PublicKeyEncryptedSessionKey::encrypt_session_key(
            &mut rng,
            pair.public_key(),
            &session_key,
        )
        .unwrap();
        write_packet(&mut msg, &pkesk).unwrap();

        let body = PacketBodyWriter::new(Tag::SymEncryptedData, msg);
        let enc = EncryptWriter::new(&mut rng, &session_key, body).unwrap();

        let mut compressed = PacketBodyWriter::new(Tag::CompressedData, enc);
        compressed
            .write_all(&[CompressionAlgorithm::ZLIB as u8])
            .unwrap();
        let mut zlib = ZlibEncoder::new(compressed, Compression::default());
        let literal = LiteralData::new_binary("", 0, (&b"tucked away"[..]).into()).unwrap();
        write_packet(&mut zlib, &literal).unwrap();

        let compressed = zlib.finish().unwrap();
        let enc = compressed.finish().unwrap();
        let body = enc.into_inner();
        let msg = body.finish().unwrap();

        let plain = decrypt_bytes(&msg, pair.secret_key(), "pass").unwrap();
        assert_eq!(plain, b"tucked away");
    }
}
