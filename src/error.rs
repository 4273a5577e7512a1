use thiserror::Error;

/// Failures of the envelope engine and the standalone password hash.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid salt length: expected {expected}, got {actual}")]
    InvalidSaltLength { expected: usize, actual: usize },

    #[error("invalid envelope: {0}")]
    InvalidEnvelope(&'static str),

    /// Wrong password and tampered data are reported the same way.
    #[error("Invalid password or corrupted data")]
    AuthenticationFailed,

    #[error("invalid password hash format")]
    InvalidHashFormat,

    #[error("OS random generator unavailable")]
    RandomSourceFailure,

    #[error("failed to construct AES-256-GCM cipher")]
    Cipher,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("password '{0}' not found")]
    EntryNotFound(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeneratorError {
    #[error("password length must be between {min} and {max} characters, got {actual}")]
    InvalidLength {
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("at least one character set must be selected")]
    NoCharacterSets,

    #[error("every selectable character is excluded")]
    EmptyCharacterPool,

    #[error("cannot avoid repeating characters with a single-character pool")]
    RepeatsUnavoidable,
}
