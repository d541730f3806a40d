//! Error types for record, key and signing operations.

use crate::keys::KeyKind;

/// Lifecycle violations: an operation invoked on a record in the wrong state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// Signing requires an unsigned record.
    #[error("record is already signed")]
    AlreadySigned,

    /// Verifying and unsigning require a signed record.
    #[error("record is not signed")]
    NotSigned,

    /// Exactly one of the two signature markers is set.
    #[error("record signature fields are inconsistent (author and signature bytes disagree)")]
    Inconsistent,
}

/// Errors from extension record, key and signing operations.
#[derive(Debug, thiserror::Error)]
pub enum ExtensionError {
    /// A fixed-size buffer had the wrong length.
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// A string field does not fit its fixed width (one byte is kept for the terminator).
    #[error("field '{field}' is too long: at most {max} bytes, got {actual}")]
    FieldTooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    /// A string field holds a non-ASCII or zero byte.
    #[error("field '{field}' must be ASCII without NUL bytes")]
    InvalidFieldByte { field: &'static str },

    /// A public key was used where a private key is required, or vice versa.
    #[error("key kind mismatch: expected {expected} key, got {actual} key")]
    KindMismatch { expected: KeyKind, actual: KeyKind },

    /// The key file text does not parse.
    #[error("malformed key file: {0}")]
    MalformedKeyFile(String),

    /// The record is in the wrong signature state.
    #[error(transparent)]
    State(#[from] StateError),

    /// The signer identity collides with the unsigned sentinel.
    #[error("'{0}' is reserved and cannot be used as a signature author")]
    ReservedAuthor(String),

    /// Key or signature bytes are incompatible with RSA/SHA-512/PKCS#1 v1.5.
    #[error("crypto failure: {0}")]
    CryptoFailure(String),

    /// A container is smaller than one record.
    #[error("container too short: need at least {need} bytes, got {len}")]
    TooShort { len: usize, need: usize },

    /// An output file name could not be derived.
    #[error("invalid file name: '{0}'")]
    InvalidFileName(String),

    /// A checkout would replace a different file that already exists.
    #[error("refusing to overwrite existing file '{0}'")]
    TargetExists(String),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = ExtensionError> = std::result::Result<T, E>;
