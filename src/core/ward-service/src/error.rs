//! Crypt service error types.

use thiserror::Error;

use ward_field::FieldError;
use ward_password::PasswordError;

/// Errors surfaced to use-cases and repository adapters.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Invalid crypto configuration. Fatal at startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Plaintext exceeds the maximum accepted length.
    #[error("input too large: {len} characters (max {max})")]
    InputTooLarge {
        /// Length of the rejected input, in characters.
        len: usize,
        /// Maximum accepted length.
        max: usize,
    },

    /// An envelope could not be decrypted. The cause is not reported.
    #[error("decryption failed")]
    DecryptionFailed,

    /// An email address failed validation.
    #[error("invalid email: {0}")]
    InvalidEmail(String),

    /// Password hashing failed (not a mismatch).
    #[error("password error: {0}")]
    Password(String),

    /// Cryptographic error.
    #[error("crypto error: {0}")]
    Crypto(#[from] ward_crypto::CryptoError),
}

impl From<FieldError> for ServiceError {
    fn from(err: FieldError) -> Self {
        match err {
            FieldError::Configuration(msg) => Self::Configuration(msg),
            FieldError::InputTooLarge { len, max } => Self::InputTooLarge { len, max },
            FieldError::DecryptionFailed => Self::DecryptionFailed,
            FieldError::Crypto(e) => Self::Crypto(e),
        }
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::Configuration(msg) => Self::Configuration(msg),
            other => Self::Password(other.to_string()),
        }
    }
}
