use num_bigint::BigUint;
use rand::{CryptoRng, Rng};
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Encrypt, Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use snafu::ResultExt;

use crate::crypto::hash::HashAlgorithm;
use crate::errors::{KeyGenerationSnafu, Result, SignatureComputationSnafu};
use crate::types::Mpi;
use crate::util::left_pad;

/// Generate an RSA private key of the given bit size.
pub fn generate_key<R: Rng + CryptoRng>(rng: &mut R, bit_size: usize) -> Result<RsaPrivateKey> {
    RsaPrivateKey::new(rng, bit_size).context(KeyGenerationSnafu)
}

/// RSA encryption using PKCS1v15 padding.
pub fn encrypt<R: Rng + CryptoRng>(
    rng: &mut R,
    n: &Mpi,
    e: &Mpi,
    plaintext: &[u8],
) -> Result<Mpi> {
    let key = RsaPublicKey::new(n.into(), e.into())?;
    let data = key.encrypt(rng, Pkcs1v15Encrypt, plaintext)?;

    Ok(Mpi::from_slice(&data))
}

/// RSA decryption using PKCS1v15 padding.
pub fn decrypt(priv_key: &RsaPrivateKey, mpi: &Mpi) -> Result<Vec<u8>> {
    let ciphertext = left_pad(mpi.as_bytes(), priv_key.size());
    let m = priv_key.decrypt(Pkcs1v15Encrypt, &ciphertext)?;

    Ok(m)
}

/// Sign a digest using RSA, with PKCS1v15 padding.
pub fn sign(key: &RsaPrivateKey, hash: HashAlgorithm, digest: &[u8]) -> Result<Mpi> {
    let sig = key
        .sign(pkcs1v15_scheme(hash), digest)
        .context(SignatureComputationSnafu)?;

    Ok(Mpi::from_slice(&sig))
}

/// Verify an RSA, PKCS1v15 padded signature.
pub fn verify(n: &Mpi, e: &Mpi, hash: HashAlgorithm, digest: &[u8], sig: &Mpi) -> Result<()> {
    let key = RsaPublicKey::new(n.into(), e.into())?;
    let sig = left_pad(sig.as_bytes(), key.size());
    key.verify(pkcs1v15_scheme(hash), digest, &sig)
        .map_err(Into::into)
}

fn pkcs1v15_scheme(hash: HashAlgorithm) -> Pkcs1v15Sign {
    match hash {
        HashAlgorithm::Sha1 => Pkcs1v15Sign::new::<sha1::Sha1>(),
        HashAlgorithm::Sha256 => Pkcs1v15Sign::new::<sha2::Sha256>(),
    }
}

/// `u = p^-1 mod q`, the final component of the serialized secret key
/// material.
pub(crate) fn u_factor(p: &BigUint, q: &BigUint) -> Result<BigUint> {
    use num_bigint::traits::ModInverse;

    p.clone()
        .mod_inverse(q)
        .and_then(|u| u.to_biguint())
        .ok_or_else(|| crate::errors::format_err!("invalid primes"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use digest::Digest;

    #[test]
    fn sign_verify_round_trip() {
        let mut rng = rand::thread_rng();
        let key = generate_key(&mut rng, 1024).unwrap();
        let n: Mpi = key.n().into();
        let e: Mpi = key.e().into();

        let digest = sha2::Sha256::digest(b"payload");
        let sig = sign(&key, HashAlgorithm::Sha256, &digest).unwrap();
        verify(&n, &e, HashAlgorithm::Sha256, &digest, &sig).unwrap();

        let other = sha2::Sha256::digest(b"tampered");
        assert!(verify(&n, &e, HashAlgorithm::Sha256, &other, &sig).is_err());
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let mut rng = rand::thread_rng();
        let key = generate_key(&mut rng, 1024).unwrap();
        let n: Mpi = key.n().into();
        let e: Mpi = key.e().into();

        let wrapped = encrypt(&mut rng, &n, &e, b"session key material").unwrap();
        let back = decrypt(&key, &wrapped).unwrap();
        assert_eq!(back, b"session key material");
    }
}
