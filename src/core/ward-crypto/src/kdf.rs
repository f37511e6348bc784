//! Key derivation functions.
//!
//! Provides HKDF (HMAC-based Key Derivation Function) as specified in RFC 5869.
//! Every field key is derived from the process master secret with the
//! derivation salt as HKDF salt and a purpose string as HKDF info.

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::aead::KEY_SIZE;
use crate::error::CryptoError;
use crate::keys::DerivedKey;

/// Derives a 256-bit key using HKDF-SHA256 (extract then expand).
///
/// # Arguments
///
/// * `master` - The master secret to derive from (HKDF input key material)
/// * `salt` - Process-wide derivation salt
/// * `info` - Purpose material binding the key to its use
pub fn derive_256(master: &[u8], salt: &[u8], info: &[u8]) -> Result<DerivedKey, CryptoError> {
    let hkdf = Hkdf::<Sha256>::new(Some(salt), master);

    let mut okm = Zeroizing::new([0u8; KEY_SIZE]);
    hkdf.expand(info, &mut okm[..])
        .map_err(|_| CryptoError::KeyGenerationFailed("HKDF expansion failed".to_string()))?;

    DerivedKey::from_bytes(&okm[..])
}
