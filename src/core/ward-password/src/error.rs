//! Password hashing error types.

use thiserror::Error;

/// Errors that can occur while hashing passwords.
///
/// A wrong password is not an error: verification returns `false`.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Invalid work factor or Argon2 parameters.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Hash computation failed.
    #[error("password hashing failed: {0}")]
    Hashing(String),

    /// The blocking worker running the hash panicked or was cancelled.
    #[error("password worker failed: {0}")]
    Worker(String),
}
