//! On-disk format of the vault file.
//!
//! A short binary header identifies the file and its version; the rest is
//! version specific. Sealed fields are already encrypted inside the document,
//! the document itself is not.

use anyhow::{Result, bail};

use crate::store::Store;

pub mod v1;

/// Magic bytes identifying a vault file ("PWVT").
pub const MAGIC: &[u8; 4] = b"PWVT";
/// Length of magic bytes.
pub const MAGIC_LEN: usize = 4;
/// Length of version field.
pub const VER_LEN: usize = 1;
/// Latest format version
pub const CURRENT_VERSION: u8 = v1::VERSION_V1;

/// Parses a vault file, dispatching on its version byte.
///
/// # Errors
///
/// Returns an error if:
/// - The file is too short
/// - The magic bytes are invalid
/// - The version is unsupported
/// - The document does not parse
pub fn parse(data: &[u8]) -> Result<Store> {
    if data.len() < MAGIC_LEN + VER_LEN {
        bail!("vault file too short");
    }

    if &data[..MAGIC_LEN] != MAGIC {
        bail!("not a pwvault file");
    }

    match data[MAGIC_LEN] {
        v1::VERSION_V1 => v1::parse(data),
        version => bail!("unsupported vault version: {version}"),
    }
}

/// Serializes a store with the current format version.
pub fn serialize(store: &Store) -> Result<Vec<u8>> {
    match CURRENT_VERSION {
        v1::VERSION_V1 => v1::serialize(store),
        version => bail!("unsupported vault version: {version}"),
    }
}
