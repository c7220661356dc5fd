use digest::DynDigest;
use num_enum::IntoPrimitive;
use sha1::Sha1;
use sha2::Sha256;

use crate::errors::{Error, Result};

/// Available hash algorithms.
/// Ref: <https://www.rfc-editor.org/rfc/rfc4880.html#section-9.4>
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash, IntoPrimitive)]
#[repr(u8)]
pub enum HashAlgorithm {
    Sha1 = 2,
    Sha256 = 8,
}

impl Default for HashAlgorithm {
    fn default() -> Self {
        Self::Sha256
    }
}

impl HashAlgorithm {
    pub fn from_u8(v: u8) -> Result<Self> {
        match v {
            2 => Ok(Self::Sha1),
            8 => Ok(Self::Sha256),
            _ => Err(Error::Message {
                message: format!("unsupported hash algorithm {}", v),
            }),
        }
    }

    /// Create a new hasher.
    pub fn new_hasher(self) -> Box<dyn DynDigest> {
        match self {
            Self::Sha1 => Box::<Sha1>::default(),
            Self::Sha256 => Box::<Sha256>::default(),
        }
    }

    /// Returns the expected digest size for the given algorithm.
    pub fn digest_size(self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 => 32,
        }
    }
}
