use byteorder::{BigEndian, ReadBytesExt};
use sha1::{Digest, Sha1};

use crate::errors::{Error, Result};

/// Two octet checksum: sum of all octets mod 65536.
pub fn calculate_simple(data: &[u8]) -> u16 {
    (data.iter().map(|v| u32::from(*v)).sum::<u32>() & 0xffff) as u16
}

/// Verifies the two octet checksum prefixing `actual`.
#[inline]
pub fn simple(actual: &[u8], data: &[u8]) -> Result<()> {
    let mut actual = actual;
    let checksum = actual.read_u16::<BigEndian>()?;
    if checksum != calculate_simple(data) {
        return Err(Error::Message {
            message: "invalid simple checksum".into(),
        });
    }

    Ok(())
}

/// SHA1 checksum, first 20 octets. A mismatch signals a wrong passphrase,
/// the deterministic check the protected key encoding embeds.
#[inline]
pub fn sha1(hash: &[u8], data: &[u8]) -> Result<()> {
    if hash != &Sha1::digest(data)[..20] {
        return Err(Error::WrongPassphrase);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_checksum() {
        let data = [1u8, 2, 250, 255];
        let sum = calculate_simple(&data);
        assert_eq!(sum, 508);

        let prefixed = [(sum >> 8) as u8, sum as u8];
        simple(&prefixed, &data).unwrap();
        assert!(simple(&[0, 0], &data).is_err());
    }

    #[test]
    fn sha1_checksum() {
        let data = b"hello world";
        let digest = Sha1::digest(data);
        sha1(&digest[..20], data).unwrap();
        assert!(matches!(
            sha1(&[0u8; 20], data),
            Err(Error::WrongPassphrase)
        ));
    }
}
