//! Binary envelope layout for encrypted fields.
//!
//! ```text
//! +---------+------------+-----------+----------------+
//! | version | nonce (12) | tag (16)  | ciphertext (N) |
//! +---------+------------+-----------+----------------+
//! ```
//!
//! Persisted as standard padded base64.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use zeroize::Zeroizing;

use ward_crypto::aead::{self, NONCE_SIZE, TAG_SIZE};
use ward_crypto::DerivedKey;

use crate::error::FieldError;
use crate::version::KeyVersion;

/// Size of the fixed envelope header (version, nonce, tag).
pub const HEADER_SIZE: usize = 1 + NONCE_SIZE + TAG_SIZE;

/// A decoded field envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Key version that produced this envelope.
    pub version: KeyVersion,
    /// AES-GCM nonce.
    pub nonce: [u8; NONCE_SIZE],
    /// AES-GCM authentication tag.
    pub tag: [u8; TAG_SIZE],
    /// Encrypted plaintext.
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Encrypts `plaintext` under `key`, recording `version` in the header.
    pub fn seal(version: KeyVersion, key: &DerivedKey, plaintext: &[u8]) -> Result<Self, FieldError> {
        let sealed = aead::encrypt_detached(key.as_bytes(), plaintext)?;

        Ok(Self {
            version,
            nonce: sealed.nonce,
            tag: sealed.tag,
            ciphertext: sealed.ciphertext,
        })
    }

    /// Authenticates and decrypts the envelope.
    pub fn open(&self, key: &DerivedKey) -> Result<Zeroizing<Vec<u8>>, FieldError> {
        aead::decrypt_detached(key.as_bytes(), &self.nonce, &self.tag, &self.ciphertext)
            .map_err(|_| FieldError::DecryptionFailed)
    }

    /// Serializes to the binary layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_SIZE + self.ciphertext.len());
        out.push(self.version.as_u8());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.tag);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Parses the binary layout.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FieldError> {
        if bytes.len() < HEADER_SIZE {
            return Err(FieldError::DecryptionFailed);
        }

        let (version, rest) = bytes.split_at(1);
        let (nonce, rest) = rest.split_at(NONCE_SIZE);
        let (tag, ciphertext) = rest.split_at(TAG_SIZE);

        let version = KeyVersion::from_byte(version[0]).ok_or(FieldError::DecryptionFailed)?;
        let nonce = <[u8; NONCE_SIZE]>::try_from(nonce).map_err(|_| FieldError::DecryptionFailed)?;
        let tag = <[u8; TAG_SIZE]>::try_from(tag).map_err(|_| FieldError::DecryptionFailed)?;

        Ok(Self {
            version,
            nonce,
            tag,
            ciphertext: ciphertext.to_vec(),
        })
    }

    /// Encodes as base64 for storage.
    pub fn encode(&self) -> String {
        BASE64.encode(self.to_bytes())
    }

    /// Decodes a stored base64 envelope.
    pub fn decode(encoded: &str) -> Result<Self, FieldError> {
        let bytes = BASE64
            .decode(encoded.trim())
            .map_err(|_| FieldError::DecryptionFailed)?;
        Self::from_bytes(&bytes)
    }
}
