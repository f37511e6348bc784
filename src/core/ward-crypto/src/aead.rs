//! AES-256-GCM authenticated encryption with a detached tag.
//!
//! The field envelope stores the authentication tag *before* the ciphertext,
//! so the primitives here keep nonce, tag and ciphertext as separate parts
//! instead of the usual `ciphertext || tag` concatenation.

use aes_gcm::{
    aead::{generic_array::GenericArray, AeadInPlace, KeyInit},
    Aes256Gcm, Nonce,
};
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::random::generate_nonce;

/// Size of an AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;

/// Size of a GCM nonce in bytes.
pub const NONCE_SIZE: usize = 12;

/// Size of a GCM authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Output of [`encrypt_detached`]: the three parts of an AES-GCM message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetachedCiphertext {
    /// Random nonce used for this message.
    pub nonce: [u8; NONCE_SIZE],
    /// GCM authentication tag.
    pub tag: [u8; TAG_SIZE],
    /// Encrypted bytes, same length as the plaintext.
    pub ciphertext: Vec<u8>,
}

fn cipher_for(key: &[u8]) -> Result<Aes256Gcm, CryptoError> {
    if key.len() != KEY_SIZE {
        return Err(CryptoError::InvalidKey(format!(
            "expected {} bytes, got {}",
            KEY_SIZE,
            key.len()
        )));
    }

    Aes256Gcm::new_from_slice(key).map_err(|e| CryptoError::InvalidKey(e.to_string()))
}

/// Encrypts plaintext using AES-256-GCM under a fresh random nonce.
///
/// No associated data is authenticated.
///
/// # Arguments
///
/// * `key` - 32-byte encryption key
/// * `plaintext` - Data to encrypt
pub fn encrypt_detached(key: &[u8], plaintext: &[u8]) -> Result<DetachedCiphertext, CryptoError> {
    let cipher = cipher_for(key)?;

    let nonce = generate_nonce();
    let mut buffer = plaintext.to_vec();

    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(&nonce), b"", &mut buffer)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    let mut tag_bytes = [0u8; TAG_SIZE];
    tag_bytes.copy_from_slice(&tag);

    Ok(DetachedCiphertext {
        nonce,
        tag: tag_bytes,
        ciphertext: buffer,
    })
}

/// Decrypts and authenticates an AES-256-GCM message given as separate parts.
///
/// Returns the plaintext wrapped in `Zeroizing` for automatic memory cleanup.
/// Any authentication failure is reported as [`CryptoError::DecryptionFailed`].
pub fn decrypt_detached(
    key: &[u8],
    nonce: &[u8; NONCE_SIZE],
    tag: &[u8; TAG_SIZE],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let cipher = cipher_for(key)?;

    let mut buffer = Zeroizing::new(ciphertext.to_vec());
    cipher
        .decrypt_in_place_detached(
            Nonce::from_slice(nonce),
            b"",
            buffer.as_mut_slice(),
            GenericArray::from_slice(tag),
        )
        .map_err(|_| CryptoError::DecryptionFailed)?;

    Ok(buffer)
}
