use std::num::NonZeroU32;

use ring::pbkdf2;
use zeroize::Zeroizing;

use super::{KEY_LEN, PBKDF2_ITERATIONS, SALT_LEN};
use crate::error::CryptoError;

const ITERATIONS: NonZeroU32 = NonZeroU32::new(PBKDF2_ITERATIONS).unwrap();

/// Derive the 32-byte encryption key for `password` and `salt`.
///
/// The key is wrapped in [`Zeroizing`], so it is wiped when the caller drops
/// it, on success and error paths alike.
pub fn derive_key(password: &str, salt: &[u8]) -> Result<Zeroizing<[u8; KEY_LEN]>, CryptoError> {
    if salt.len() != SALT_LEN {
        return Err(CryptoError::InvalidSaltLength {
            expected: SALT_LEN,
            actual: salt.len(),
        });
    }

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    derive_into(password.as_bytes(), salt, ITERATIONS, &mut key[..]);
    Ok(key)
}

fn derive_into(secret: &[u8], salt: &[u8], iterations: NonZeroU32, out: &mut [u8]) {
    pbkdf2::derive(pbkdf2::PBKDF2_HMAC_SHA256, iterations, salt, secret, out);
}
