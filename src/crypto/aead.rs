use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use getrandom::fill;
use zeroize::Zeroizing;

use super::{Envelope, NONCE_LEN, SALT_LEN, TAG_LEN, derive_key};
use crate::error::CryptoError;

/// Fill buffer with cryptographically secure random bytes
pub fn secure_random(buf: &mut [u8]) -> Result<(), CryptoError> {
    fill(buf).map_err(|_| CryptoError::RandomSourceFailure)
}

/// Produce `len` cryptographically secure random bytes
pub fn random_bytes(len: usize) -> Result<Vec<u8>, CryptoError> {
    let mut buf = vec![0u8; len];
    secure_random(&mut buf)?;
    Ok(buf)
}

/// Generate salt
pub fn generate_salt() -> Result<[u8; SALT_LEN], CryptoError> {
    let mut salt = [0u8; SALT_LEN];
    secure_random(&mut salt)?;
    Ok(salt)
}

fn generate_nonce() -> Result<[u8; NONCE_LEN], CryptoError> {
    let mut nonce = [0u8; NONCE_LEN];
    secure_random(&mut nonce)?;
    Ok(nonce)
}

/// Seal `plaintext` under a key derived from `password`.
///
/// Salt and nonce are drawn independently from the OS generator on every call.
/// The derived key is zeroed before returning.
pub fn seal(plaintext: &[u8], password: &str) -> Result<Envelope, CryptoError> {
    let salt = generate_salt()?;
    let key = derive_key(password, &salt)?;
    let cipher = Aes256Gcm::new_from_slice(key.as_slice()).map_err(|_| CryptoError::Cipher)?;

    let nonce = generate_nonce()?;
    let mut ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| CryptoError::Cipher)?;

    // GCM appends the tag to the ciphertext
    let tag = ciphertext.split_off(ciphertext.len() - TAG_LEN);

    Ok(Envelope::from_parts(
        salt.to_vec(),
        nonce.to_vec(),
        ciphertext,
        tag,
    ))
}

/// Open an envelope sealed with `password`.
///
/// Salt, nonce and tag lengths are checked before any key derivation. A wrong
/// password and a modified envelope both yield
/// [`CryptoError::AuthenticationFailed`]; no plaintext is released unless the
/// tag verifies.
pub fn open(envelope: &Envelope, password: &str) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    envelope.validate()?;

    let key = derive_key(password, envelope.salt())?;
    let cipher = Aes256Gcm::new_from_slice(key.as_slice()).map_err(|_| CryptoError::Cipher)?;

    let mut sealed = Vec::with_capacity(envelope.ciphertext().len() + TAG_LEN);
    sealed.extend_from_slice(envelope.ciphertext());
    sealed.extend_from_slice(envelope.tag());

    let plaintext = cipher
        .decrypt(Nonce::from_slice(envelope.nonce()), sealed.as_slice())
        .map_err(|_| CryptoError::AuthenticationFailed)?;

    Ok(Zeroizing::new(plaintext))
}
