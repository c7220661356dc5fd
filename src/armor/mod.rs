//! ASCII Armor according to
//! <https://www.rfc-editor.org/rfc/rfc4880.html#section-6>

mod reader;
mod writer;

pub use self::reader::Dearmor;
pub use self::writer::ArmorWriter;

use crate::errors::{Error, Result};

/// The kind of block an armored stream carries.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BlockType {
    Message,
    PublicKey,
    PrivateKey,
    Signature,
}

impl BlockType {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            BlockType::Message => "PGP MESSAGE",
            BlockType::PublicKey => "PGP PUBLIC KEY BLOCK",
            BlockType::PrivateKey => "PGP PRIVATE KEY BLOCK",
            BlockType::Signature => "PGP SIGNATURE",
        }
    }

    pub(crate) fn from_str(s: &str) -> Result<Self> {
        match s {
            "PGP MESSAGE" => Ok(BlockType::Message),
            "PGP PUBLIC KEY BLOCK" => Ok(BlockType::PublicKey),
            "PGP PRIVATE KEY BLOCK" => Ok(BlockType::PrivateKey),
            "PGP SIGNATURE" => Ok(BlockType::Signature),
            _ => Err(Error::InvalidArmorWrappers),
        }
    }
}
