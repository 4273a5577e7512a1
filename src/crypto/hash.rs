//! Standalone password hash used to verify the master password.
//!
//! Format: `base64(salt (32) || PBKDF2-HMAC-SHA256(password, salt) (32))`.

use base64::{Engine, engine::general_purpose::STANDARD};
use zeroize::Zeroizing;

use super::{KEY_LEN, SALT_LEN, aead::generate_salt, derive_key};
use crate::error::CryptoError;

pub fn hash_password(password: &str) -> Result<String, CryptoError> {
    let salt = generate_salt()?;
    let key = derive_key(password, &salt)?;

    let mut combined = Zeroizing::new(Vec::with_capacity(SALT_LEN + KEY_LEN));
    combined.extend_from_slice(&salt);
    combined.extend_from_slice(key.as_slice());

    Ok(STANDARD.encode(combined.as_slice()))
}

/// Returns `Ok(false)` for a wrong password and
/// [`CryptoError::InvalidHashFormat`] when `encoded` is not a hash at all.
pub fn verify_password(password: &str, encoded: &str) -> Result<bool, CryptoError> {
    let combined = Zeroizing::new(
        STANDARD
            .decode(encoded)
            .map_err(|_| CryptoError::InvalidHashFormat)?,
    );
    if combined.len() != SALT_LEN + KEY_LEN {
        return Err(CryptoError::InvalidHashFormat);
    }

    let (salt, stored) = combined.split_at(SALT_LEN);
    let key = derive_key(password, salt)?;

    Ok(constant_time_eq(key.as_slice(), stored))
}

/// Compares two buffers without branching on their contents.
///
/// Only a length mismatch returns early; lengths are not secret.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let diff = a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y));
    std::hint::black_box(diff) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_same_password() {
        let hash = hash_password("master").unwrap();
        assert!(verify_password("master", &hash).unwrap());
    }

    #[test]
    fn hash_rejects_other_password() {
        let hash = hash_password("master").unwrap();
        assert!(!verify_password("Master", &hash).unwrap());
    }

    #[test]
    fn hashes_of_same_password_differ() {
        let a = hash_password("master").unwrap();
        let b = hash_password("master").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn hash_decodes_to_salt_and_key() {
        let hash = hash_password("master").unwrap();
        assert_eq!(STANDARD.decode(hash).unwrap().len(), SALT_LEN + KEY_LEN);
    }

    #[test]
    fn malformed_hash_is_rejected() {
        assert_eq!(
            verify_password("pw", "not base64!"),
            Err(CryptoError::InvalidHashFormat)
        );

        let short = STANDARD.encode([0u8; 48]);
        assert_eq!(
            verify_password("pw", &short),
            Err(CryptoError::InvalidHashFormat)
        );
    }

    #[test]
    fn constant_time_eq_semantics() {
        assert!(constant_time_eq(b"", b""));
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"xbc"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
        assert!(!constant_time_eq(b"abcd", b"abc"));
    }
}
