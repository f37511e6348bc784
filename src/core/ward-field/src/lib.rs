//! # Ward Field
//!
//! Field-level encryption for personally identifiable data at rest.
//!
//! ## Features
//!
//! - Versioned AES-256-GCM envelopes, decryptable after key rotation
//! - Deterministic HMAC lookup index (blind index) for equality search
//! - Per-purpose keys derived with HKDF and memoized per process
//! - Rewrap of old envelopes under the active key version
//!
//! ## Envelope Format
//!
//! Envelopes are base64 encodings of `[version:1][nonce:12][tag:16][ciphertext]`.
//!
//! The leading version byte selects the decryption key, so envelopes written
//! under an old key version stay readable after the active version changes.
//!
//! ## Normalization
//!
//! Plaintext is trimmed and lowercased before encryption and before lookup
//! hashing. Decryption returns the normalized form.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cipher;
pub mod config;
pub mod envelope;
pub mod error;
pub mod keyring;
pub mod version;

pub use cipher::{normalize, FieldCipher, MAX_PLAINTEXT_CHARS};
pub use config::FieldConfig;
pub use envelope::Envelope;
pub use error::FieldError;
pub use keyring::{KeyPurpose, KeyRing};
pub use version::KeyVersion;
