//! Cryptographic primitives for the vault.
//!
//! Every stored secret is sealed into an [`Envelope`] with AES-256-GCM under a
//! key derived from the master password with PBKDF2-HMAC-SHA256. Each seal
//! draws a fresh salt and a fresh nonce, so no key/nonce pair ever repeats.
//! The standalone password hash in [`hash`] verifies the master password
//! without decrypting anything.

pub mod aead;
pub mod envelope;
pub mod hash;
pub mod kdf;

pub use aead::{open, random_bytes, seal};
pub use envelope::Envelope;
pub use hash::{constant_time_eq, hash_password, verify_password};
pub use kdf::derive_key;

/// Length of the key-derivation salt (32 bytes).
pub const SALT_LEN: usize = 32;
/// Length of the AES-GCM nonce (12 bytes / 96 bits).
pub const NONCE_LEN: usize = 12;
/// Length of the GCM authentication tag (16 bytes).
pub const TAG_LEN: usize = 16;
/// Length of the derived key (32 bytes / 256 bits).
pub const KEY_LEN: usize = 32;
/// PBKDF2 iteration count. Not stored alongside envelopes, so changing it
/// breaks every existing vault.
pub const PBKDF2_ITERATIONS: u32 = 100_000;
