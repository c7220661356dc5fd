use std::io::{BufRead, BufReader, Read, Write};

use chrono::Utc;
use digest::DynDigest;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use log::{debug, warn};

use crate::armor::{ArmorWriter, BlockType, Dearmor};
use crate::crypto::hash::HashAlgorithm;
use crate::errors::{bail, Error, Result};
use crate::packet::{
    write_packet, CompressionAlgorithm, LiteralDataHeader, OnePassSignature, PacketBodyReader,
    PacketBodyWriter, PacketHeader, PublicKey, SecretKey, Signature, SignatureType,
    UnlockedSecretKey,
};
use crate::types::{KeyId, Tag};
use crate::util::fill_buffer;

/// A flat collection of public keys, addressed by key id.
#[derive(Debug, Default, Clone)]
pub struct Keyring {
    keys: Vec<PublicKey>,
}

impl Keyring {
    pub fn new(keys: Vec<PublicKey>) -> Self {
        Keyring { keys }
    }

    pub fn add(&mut self, key: PublicKey) {
        self.keys.push(key);
    }

    pub fn get(&self, key_id: &KeyId) -> Option<&PublicKey> {
        self.keys.iter().find(|k| &k.key_id() == key_id)
    }
}

impl From<PublicKey> for Keyring {
    fn from(key: PublicKey) -> Self {
        Keyring { keys: vec![key] }
    }
}

/// The result of checking a signed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationOutcome {
    /// Whether the signature matched the recovered data.
    pub valid: bool,
    /// File name recorded in the literal data packet.
    pub file_name: String,
    /// The recovered data itself.
    pub data: Vec<u8>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum SignerState {
    Start,
    EmittedOnePass,
    StreamingLiteral,
    Finalized,
}

/// Incremental one-pass signer. The declaration packet goes out first,
/// data is hashed as it streams through, and the trailing signature
/// packet is computed at the end without a second pass over the input.
///
/// Methods must be called in order; calling them out of order is an
/// error rather than a silent misuse.
pub struct OnePassSigner {
    state: SignerState,
    typ: SignatureType,
    hash_algorithm: HashAlgorithm,
    created: u32,
    hasher: Box<dyn DynDigest>,
    key: UnlockedSecretKey,
}

impl OnePassSigner {
    pub fn new(key: &SecretKey, passphrase: &str) -> Result<Self> {
        let key = key.unlock(passphrase).map_err(|err| Error::KeyUnlock {
            source: Box::new(err),
        })?;
        let hash_algorithm = HashAlgorithm::Sha256;

        Ok(OnePassSigner {
            state: SignerState::Start,
            typ: SignatureType::Binary,
            hash_algorithm,
            created: Utc::now().timestamp() as u32,
            hasher: hash_algorithm.new_hasher(),
            key,
        })
    }

    /// Writes the one pass signature declaration packet.
    pub fn emit_one_pass<W: Write>(&mut self, sink: &mut W) -> Result<()> {
        if self.state != SignerState::Start {
            bail!("one pass declaration already emitted");
        }

        let ops = OnePassSignature::new(self.typ, self.hash_algorithm, self.key.key_id());
        write_packet(sink, &ops)?;
        self.state = SignerState::EmittedOnePass;

        Ok(())
    }

    /// Feeds a chunk of the data being signed into the hash context.
    pub fn update(&mut self, data: &[u8]) -> Result<()> {
        match self.state {
            SignerState::EmittedOnePass | SignerState::StreamingLiteral => {
                self.hasher.update(data);
                self.state = SignerState::StreamingLiteral;
                Ok(())
            }
            _ => bail!("signer is not streaming"),
        }
    }

    /// Computes the signature over everything fed via
    /// [`update`](Self::update) and writes the trailing signature packet.
    pub fn finalize<W: Write>(&mut self, sink: &mut W) -> Result<()> {
        match self.state {
            SignerState::EmittedOnePass | SignerState::StreamingLiteral => {}
            _ => bail!("signer cannot finalize in this state"),
        }
        self.state = SignerState::Finalized;

        Signature::hash_trailer(&mut self.hasher, self.typ, self.created);
        let digest = self.hasher.finalize_reset();

        let signed_hash_value = [digest[0], digest[1]];
        let signature = self.key.sign(self.hash_algorithm, &digest)?;

        let sig = Signature::new(
            self.typ,
            self.created,
            self.key.key_id(),
            self.hash_algorithm,
            signed_hash_value,
            signature,
        );
        write_packet(sink, &sig)?;

        Ok(())
    }
}

/// Signs `source` into a compressed one-pass signed message.
///
/// Layout: a zlib compressed data packet containing the one pass
/// declaration, the literal data and the trailing signature. With
/// `armored` the whole binary stream is armor encoded, not the
/// individual packets.
pub fn sign<S, W>(
    source: S,
    file_name: &str,
    mtime: u32,
    key: &SecretKey,
    passphrase: &str,
    armored: bool,
    sink: W,
) -> Result<W>
where
    S: Read,
    W: Write,
{
    if armored {
        let armor = ArmorWriter::new(sink, BlockType::Message)?;
        let armor = sign_binary(source, file_name, mtime, key, passphrase, armor)?;
        Ok(armor.finalize()?)
    } else {
        sign_binary(source, file_name, mtime, key, passphrase, sink)
    }
}

fn sign_binary<S, W>(
    mut source: S,
    file_name: &str,
    mtime: u32,
    key: &SecretKey,
    passphrase: &str,
    sink: W,
) -> Result<W>
where
    S: Read,
    W: Write,
{
    let mut signer = OnePassSigner::new(key, passphrase)?;

    let mut compressed = PacketBodyWriter::new(Tag::CompressedData, sink);
    compressed.write_all(&[CompressionAlgorithm::ZLIB as u8])?;
    let mut zlib = ZlibEncoder::new(compressed, Compression::default());

    signer.emit_one_pass(&mut zlib)?;

    let mut literal = PacketBodyWriter::new(Tag::LiteralData, zlib);
    LiteralDataHeader::new_binary(file_name, mtime)?.to_writer(&mut literal)?;

    let mut buf = [0u8; 8192];
    loop {
        let n = fill_buffer(&mut source, &mut buf)?;
        if n == 0 {
            break;
        }
        signer.update(&buf[..n])?;
        literal.write_all(&buf[..n])?;
    }

    let mut zlib = literal.finish()?;
    signer.finalize(&mut zlib)?;

    let compressed = zlib.finish()?;
    let sink = compressed.finish()?;

    Ok(sink)
}

/// Checks a signed message against the keyring.
///
/// Armored input is detected automatically. Structural problems and an
/// unknown signer are reported as errors; a signature that simply does
/// not match yields `valid: false`.
pub fn verify<S: BufRead>(mut source: S, keyring: &Keyring) -> Result<VerificationOutcome> {
    let head = source.fill_buf()?;
    if head.is_empty() {
        bail!("empty input");
    }

    // binary packet headers always have the high bit set
    if head[0] & 0x80 == 0 {
        let dearmor = Dearmor::new(source)?;
        verify_binary(BufReader::new(dearmor), keyring)
    } else {
        verify_binary(source, keyring)
    }
}

fn verify_binary<S: BufRead>(mut source: S, keyring: &Keyring) -> Result<VerificationOutcome> {
    let header = PacketHeader::from_reader(&mut source)?;
    if header.tag()? != Tag::CompressedData {
        bail!("expected a compressed data packet, got {:?}", header.tag()?);
    }

    let mut body = PacketBodyReader::new(header, source);
    let mut alg = [0u8; 1];
    body.read_exact(&mut alg)?;

    let decompressed: Box<dyn Read + '_> = match CompressionAlgorithm::from_u8(alg[0])? {
        CompressionAlgorithm::ZLIB => Box::new(flate2::read::ZlibDecoder::new(body)),
        CompressionAlgorithm::Uncompressed => Box::new(body),
    };
    let mut inner = BufReader::new(decompressed);

    // one pass declaration
    let header = PacketHeader::from_reader(&mut inner)?;
    if header.tag()? != Tag::OnePassSignature {
        bail!("expected a one pass signature packet, got {:?}", header.tag()?);
    }
    let ops_body = PacketBodyReader::new(header, &mut inner).into_vec()?;
    let ops = OnePassSignature::from_buf(&ops_body[..])?;
    debug!("message signed by {}", ops.key_id());

    let key = keyring
        .get(&ops.key_id())
        .ok_or_else(|| Error::UnknownSigner {
            key_id: ops.key_id().to_string(),
        })?;

    // literal data, hashed as it is read
    let header = PacketHeader::from_reader(&mut inner)?;
    if header.tag()? != Tag::LiteralData {
        bail!("expected a literal data packet, got {:?}", header.tag()?);
    }
    let mut literal = PacketBodyReader::new(header, &mut inner);
    let literal_header = LiteralDataHeader::from_reader(&mut literal)?;

    let mut hasher = ops.hash_algorithm().new_hasher();
    let mut data = Vec::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = literal.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        data.extend_from_slice(&buf[..n]);
    }

    // trailing signature
    let header = PacketHeader::from_reader(&mut inner)?;
    if header.tag()? != Tag::Signature {
        bail!("expected a signature packet, got {:?}", header.tag()?);
    }
    let sig_body = PacketBodyReader::new(header, &mut inner).into_vec()?;
    let sig = Signature::from_buf(&sig_body[..])?;

    Signature::hash_trailer(&mut hasher, sig.typ(), sig.created());
    let digest = hasher.finalize_reset();

    let valid = digest[..2] == sig.signed_hash_value()
        && key
            .verify_signature(sig.hash_algorithm(), &digest, sig.signature())
            .is_ok();

    Ok(VerificationOutcome {
        valid,
        file_name: literal_header.file_name.clone(),
        data,
    })
}

/// Boolean verification over an in-memory buffer. Errors are logged and
/// reported as a failed verification; [`verify`] is the strict variant.
pub fn verify_bytes(data: &[u8], keyring: &Keyring) -> bool {
    match verify(data, keyring) {
        Ok(outcome) => outcome.valid,
        Err(err) => {
            warn!("verification failed: {}", err);
            false
        }
    }
}

/// Buffer-returning verification. `None` both when the signature does
/// not match and when the message cannot be processed at all.
pub fn verify_to_bytes(data: &[u8], keyring: &Keyring) -> Option<Vec<u8>> {
    match verify(data, keyring) {
        Ok(outcome) if outcome.valid => Some(outcome.data),
        Ok(_) => None,
        Err(err) => {
            warn!("verification failed: {}", err);
            None
        }
    }
}

/// Verifies a signed message and writes the recovered data to `sink`
/// only when the signature checks out. An invalid signature leaves the
/// sink untouched.
pub fn verify_to_writer<S, W>(source: S, keyring: &Keyring, sink: &mut W) -> Result<bool>
where
    S: BufRead,
    W: Write,
{
    let outcome = verify(source, keyring)?;
    if outcome.valid {
        sink.write_all(&outcome.data)?;
    }

    Ok(outcome.valid)
}
