use num_enum::IntoPrimitive;

use crate::errors::{Error, Result};

/// Available public key algorithms.
/// Only RSA (encrypt and sign) is supported, the single scheme the
/// container format commits to.
/// Ref: <https://www.rfc-editor.org/rfc/rfc4880.html#section-9.1>
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash, IntoPrimitive)]
#[repr(u8)]
pub enum PublicKeyAlgorithm {
    /// RSA (Encrypt and Sign)
    RSA = 1,
}

impl PublicKeyAlgorithm {
    pub fn from_u8(v: u8) -> Result<Self> {
        match v {
            1 => Ok(Self::RSA),
            _ => Err(Error::Message {
                message: format!("unsupported public key algorithm {}", v),
            }),
        }
    }
}
