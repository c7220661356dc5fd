use std::io;

use bytes::Buf;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use rand::{CryptoRng, Rng};
use zeroize::Zeroizing;

use crate::crypto::hash::HashAlgorithm;
use crate::errors::{bail, ensure, Result};
use crate::parsing::BufParsing;
use crate::ser::Serialize;

/// Available String-To-Key types.
/// Ref: <https://www.rfc-editor.org/rfc/rfc4880.html#section-3.7>
#[derive(Debug, PartialEq, Eq, Copy, Clone, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum StringToKeyType {
    Simple = 0,
    Salted = 1,
    IteratedAndSalted = 3,
}

/// String-To-Key specifier: turns a passphrase into a symmetric key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringToKey {
    typ: StringToKeyType,
    hash: HashAlgorithm,
    salt: Option<[u8; 8]>,
}

impl StringToKey {
    /// A fresh salted S2K, the only kind this crate produces.
    pub fn new_salted<R: Rng + CryptoRng>(rng: &mut R) -> Self {
        let mut salt = [0u8; 8];
        rng.fill_bytes(&mut salt);

        StringToKey {
            typ: StringToKeyType::Salted,
            hash: HashAlgorithm::Sha256,
            salt: Some(salt),
        }
    }

    pub fn typ(&self) -> StringToKeyType {
        self.typ
    }

    pub fn from_buf<B: Buf>(mut i: B) -> Result<Self> {
        let typ = i.read_u8()?;
        let typ = StringToKeyType::try_from(typ)
            .map_err(|_| crate::errors::format_err!("unsupported s2k type {}", typ))?;
        let hash = HashAlgorithm::from_u8(i.read_u8()?)?;

        let salt = match typ {
            StringToKeyType::Simple => None,
            StringToKeyType::Salted => Some(i.read_array::<8>()?),
            StringToKeyType::IteratedAndSalted => {
                bail!("iterated and salted s2k is not supported");
            }
        };

        Ok(StringToKey { typ, hash, salt })
    }

    /// Derives a symmetric key of `key_size` bytes from the passphrase.
    pub fn derive_key(&self, passphrase: &str, key_size: usize) -> Result<Zeroizing<Vec<u8>>> {
        let mut hasher = self.hash.new_hasher();
        if let Some(ref salt) = self.salt {
            hasher.update(salt);
        }
        hasher.update(passphrase.as_bytes());

        let digest = Zeroizing::new(hasher.finalize().to_vec());
        ensure!(
            digest.len() >= key_size,
            "s2k hash {:?} is too short for a {} byte key",
            self.hash,
            key_size
        );

        Ok(Zeroizing::new(digest[..key_size].to_vec()))
    }
}

impl Serialize for StringToKey {
    fn to_writer<W: io::Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(&[self.typ.into(), self.hash.into()])?;
        if let Some(ref salt) = self.salt {
            w.write_all(salt)?;
        }

        Ok(())
    }

    fn write_len(&self) -> usize {
        2 + self.salt.map_or(0, |s| s.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salted_derivation_is_deterministic() {
        let mut rng = rand::thread_rng();
        let s2k = StringToKey::new_salted(&mut rng);

        let k1 = s2k.derive_key("correct horse", 16).unwrap();
        let k2 = s2k.derive_key("correct horse", 16).unwrap();
        assert_eq!(k1, k2);
        assert_eq!(k1.len(), 16);

        let other = s2k.derive_key("battery staple", 16).unwrap();
        assert_ne!(k1, other);
    }

    #[test]
    fn serialization_round_trip() {
        let mut rng = rand::thread_rng();
        let s2k = StringToKey::new_salted(&mut rng);

        let bytes = s2k.to_bytes().unwrap();
        assert_eq!(bytes.len(), s2k.write_len());

        let back = StringToKey::from_buf(&mut &bytes[..]).unwrap();
        assert_eq!(back, s2k);
    }
}
