//! File format v1.
//!
//! ```text
//! MAGIC (4) | VERSION (1) | JSON document (UTF-8)
//! ```

use super::{MAGIC, MAGIC_LEN, VER_LEN};
use crate::store::Store;
use anyhow::{Context, Result, bail};

pub const VERSION_V1: u8 = 1;

const HEADER_LEN: usize = MAGIC_LEN + VER_LEN;

/// Parses a v1 vault file. Magic and version are checked by the caller.
pub fn parse(data: &[u8]) -> Result<Store> {
    if data.len() <= HEADER_LEN {
        bail!("vault file too short for v1");
    }

    serde_json::from_slice(&data[HEADER_LEN..]).context("vault document is corrupted")
}

pub fn serialize(store: &Store) -> Result<Vec<u8>> {
    let document = serde_json::to_vec_pretty(store).context("failed to serialize vault")?;

    let mut buf = Vec::with_capacity(HEADER_LEN + document.len());
    buf.extend_from_slice(MAGIC);
    buf.push(VERSION_V1);
    buf.extend_from_slice(&document);

    Ok(buf)
}
