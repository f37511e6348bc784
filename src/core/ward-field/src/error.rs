//! Field encryption error types.

use thiserror::Error;

/// Errors that can occur in the field encryption engine.
#[derive(Debug, Error)]
pub enum FieldError {
    /// A secret or setting is missing, malformed, too short or all-zero.
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

    /// The envelope could not be decoded, authenticated or decrypted.
    ///
    /// The cause is intentionally not reported.
    #[error("decryption failed")]
    DecryptionFailed,

    /// Cryptographic error.
    #[error("crypto error: {0}")]
    Crypto(#[from] ward_crypto::CryptoError),
}
