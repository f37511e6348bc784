//! # Ward Crypto
//!
//! Core cryptographic primitives for Nubster Ward.
//!
//! This crate provides the low-level building blocks used by the field
//! encryption engine:
//! - Symmetric encryption (AES-256-GCM, detached tag)
//! - Key derivation (HKDF-SHA256)
//! - Keyed hashing (HMAC-SHA256)
//! - Secure random generation
//! - Zeroizing key and secret containers

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aead;
pub mod error;
pub mod kdf;
pub mod keys;
pub mod mac;
pub mod random;

pub use error::CryptoError;
pub use keys::{DerivedKey, SecretMaterial};
