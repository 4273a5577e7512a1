//! The sealed form of a single secret.
//!
//! Serialized as a record with four named fields, each holding standard base64:
//!
//! ```text
//! { "salt": <32 bytes>, "nonce": <12 bytes>, "ciphertext": <len(plaintext)>, "tag": <16 bytes> }
//! ```

use serde::{Deserialize, Serialize};

use super::{NONCE_LEN, SALT_LEN, TAG_LEN};
use crate::error::CryptoError;

/// Salt, nonce, ciphertext and GCM tag of one sealed value.
///
/// Only [`seal`](super::seal) creates envelopes with valid contents; everything
/// else treats them as opaque bytes and hands them back to
/// [`open`](super::open).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(with = "base64_bytes")]
    salt: Vec<u8>,
    #[serde(with = "base64_bytes")]
    nonce: Vec<u8>,
    #[serde(with = "base64_bytes")]
    ciphertext: Vec<u8>,
    #[serde(with = "base64_bytes")]
    tag: Vec<u8>,
}

impl Envelope {
    /// Assembles an envelope from raw parts, e.g. when loading from an
    /// external store. Lengths are checked by [`open`](super::open).
    pub fn from_parts(salt: Vec<u8>, nonce: Vec<u8>, ciphertext: Vec<u8>, tag: Vec<u8>) -> Self {
        Self {
            salt,
            nonce,
            ciphertext,
            tag,
        }
    }

    /// Returns `(salt, nonce, ciphertext, tag)`.
    pub fn into_parts(self) -> (Vec<u8>, Vec<u8>, Vec<u8>, Vec<u8>) {
        (self.salt, self.nonce, self.ciphertext, self.tag)
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn nonce(&self) -> &[u8] {
        &self.nonce
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    pub fn tag(&self) -> &[u8] {
        &self.tag
    }

    pub(crate) fn validate(&self) -> Result<(), CryptoError> {
        if self.salt.len() != SALT_LEN {
            return Err(CryptoError::InvalidEnvelope("invalid salt length"));
        }
        if self.nonce.len() != NONCE_LEN {
            return Err(CryptoError::InvalidEnvelope("invalid nonce length"));
        }
        if self.tag.len() != TAG_LEN {
            return Err(CryptoError::InvalidEnvelope("invalid tag length"));
        }
        Ok(())
    }
}

mod base64_bytes {
    use base64::{Engine, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<T, S>(bytes: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: AsRef<[u8]>,
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes.as_ref()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Envelope {
        Envelope::from_parts(
            vec![1u8; SALT_LEN],
            vec![2u8; NONCE_LEN],
            vec![3u8; 5],
            vec![4u8; TAG_LEN],
        )
    }

    #[test]
    fn json_uses_named_base64_fields() {
        let json: serde_json::Value = serde_json::to_value(sample()).unwrap();

        assert_eq!(json["nonce"], "AgICAgICAgICAgIC");
        assert_eq!(json["ciphertext"], "AwMDAwM=");
        assert!(json["salt"].is_string());
        assert!(json["tag"].is_string());
    }

    #[test]
    fn json_preserves_exact_bytes() {
        let env = sample();
        let text = serde_json::to_string(&env).unwrap();
        let parsed: Envelope = serde_json::from_str(&text).unwrap();

        assert_eq!(parsed, env);
        assert_eq!(parsed.salt().len(), SALT_LEN);
        assert_eq!(parsed.nonce().len(), NONCE_LEN);
        assert_eq!(parsed.tag().len(), TAG_LEN);
    }

    #[test]
    fn invalid_base64_is_rejected() {
        let text = r#"{"salt":"!!","nonce":"","ciphertext":"","tag":""}"#;
        assert!(serde_json::from_str::<Envelope>(text).is_err());
    }

    #[test]
    fn missing_field_is_rejected() {
        let text = r#"{"salt":"","nonce":"","ciphertext":""}"#;
        assert!(serde_json::from_str::<Envelope>(text).is_err());
    }

    #[test]
    fn validate_checks_lengths() {
        assert!(sample().validate().is_ok());

        let (_, nonce, ct, tag) = sample().into_parts();
        let short_salt = Envelope::from_parts(vec![0u8; 16], nonce, ct, tag);
        assert_eq!(
            short_salt.validate(),
            Err(CryptoError::InvalidEnvelope("invalid salt length"))
        );

        let (salt, _, ct, tag) = sample().into_parts();
        let long_nonce = Envelope::from_parts(salt, vec![0u8; 24], ct, tag);
        assert_eq!(
            long_nonce.validate(),
            Err(CryptoError::InvalidEnvelope("invalid nonce length"))
        );
    }
}
