//! HMAC-SHA256 keyed hashing.
//!
//! Backs the deterministic lookup index: the same key and message always
//! produce the same 32-byte digest, and the digest reveals nothing about the
//! message beyond equality while the key stays secret.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::CryptoError;

type HmacSha256 = Hmac<Sha256>;

/// Size of an HMAC-SHA256 digest in bytes.
pub const DIGEST_SIZE: usize = 32;

fn mac_for(key: &[u8], message: &[u8]) -> Result<HmacSha256, CryptoError> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
    mac.update(message);
    Ok(mac)
}

/// Computes `HMAC-SHA256(key, message)`.
pub fn hmac_sha256(key: &[u8], message: &[u8]) -> Result<[u8; DIGEST_SIZE], CryptoError> {
    let digest = mac_for(key, message)?.finalize().into_bytes();

    let mut out = [0u8; DIGEST_SIZE];
    out.copy_from_slice(&digest);
    Ok(out)
}

/// Checks `expected` against `HMAC-SHA256(key, message)` in constant time.
pub fn verify_hmac_sha256(key: &[u8], message: &[u8], expected: &[u8]) -> Result<bool, CryptoError> {
    Ok(mac_for(key, message)?.verify_slice(expected).is_ok())
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn test_hmac_rfc4231_test_case_2() {
        let digest = hmac_sha256(b"Jefe", b"what do ya want for nothing?").unwrap();
        assert_eq!(
            hex::encode(digest),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_hmac_deterministic() {
        let a = hmac_sha256(&[7u8; 32], b"foo@bar.com").unwrap();
        let b = hmac_sha256(&[7u8; 32], b"foo@bar.com").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_hmac_key_sensitive() {
        let a = hmac_sha256(&[7u8; 32], b"foo@bar.com").unwrap();
        let b = hmac_sha256(&[8u8; 32], b"foo@bar.com").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_hmac() {
        let key = [3u8; 32];
        let digest = hmac_sha256(&key, b"message").unwrap();

        assert!(verify_hmac_sha256(&key, b"message", &digest).unwrap());
        assert!(!verify_hmac_sha256(&key, b"other", &digest).unwrap());
        assert!(!verify_hmac_sha256(&key, b"message", &digest[..16]).unwrap());
    }
}
