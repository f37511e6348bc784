//! Versioned envelope cipher and deterministic lookup hasher.

use std::sync::Arc;

use tracing::{debug, info};
use zeroize::Zeroizing;

use ward_crypto::mac;

use crate::config::FieldConfig;
use crate::envelope::Envelope;
use crate::error::FieldError;
use crate::keyring::KeyRing;
use crate::version::KeyVersion;

/// Maximum plaintext length accepted for encryption or lookup hashing.
pub const MAX_PLAINTEXT_CHARS: usize = 10_000;

/// Trims surrounding whitespace and lowercases.
///
/// Applied before both encryption and lookup hashing, so case and padding
/// are not preserved through a round trip.
pub fn normalize(input: &str) -> String {
    input.trim().to_lowercase()
}

fn check_length(plaintext: &str) -> Result<(), FieldError> {
    // Byte length bounds the char count, so most inputs skip the scan.
    if plaintext.len() <= MAX_PLAINTEXT_CHARS {
        return Ok(());
    }

    let len = plaintext.chars().count();
    if len > MAX_PLAINTEXT_CHARS {
        return Err(FieldError::InputTooLarge {
            len,
            max: MAX_PLAINTEXT_CHARS,
        });
    }
    Ok(())
}

fn prepare(plaintext: &str) -> Result<Zeroizing<String>, FieldError> {
    check_length(plaintext)?;
    Ok(Zeroizing::new(normalize(plaintext)))
}

/// Encrypts, decrypts and indexes PII fields.
///
/// Cloning is cheap: clones share the same [`KeyRing`] and its cache.
#[derive(Debug, Clone)]
pub struct FieldCipher {
    keys: Arc<KeyRing>,
    active_version: KeyVersion,
}

impl FieldCipher {
    /// Validates `config` and creates a cipher.
    pub fn new(config: &FieldConfig) -> Result<Self, FieldError> {
        let active_version = config.active_version()?;
        let keys = Arc::new(config.key_ring()?);

        info!(active_version = %active_version, "Field cipher initialized");

        Ok(Self::from_key_ring(keys, active_version))
    }

    /// Creates a cipher over an existing key ring.
    pub fn from_key_ring(keys: Arc<KeyRing>, active_version: KeyVersion) -> Self {
        Self {
            keys,
            active_version,
        }
    }

    /// Returns a handle on the same key ring that encrypts under `version`.
    pub fn with_active_version(&self, version: KeyVersion) -> Self {
        Self::from_key_ring(Arc::clone(&self.keys), version)
    }

    /// Key version used for new envelopes.
    pub fn active_version(&self) -> KeyVersion {
        self.active_version
    }

    /// The shared key ring.
    pub fn key_ring(&self) -> &Arc<KeyRing> {
        &self.keys
    }

    /// Normalizes and encrypts `plaintext` into a base64 envelope.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, FieldError> {
        let normalized = prepare(plaintext)?;
        self.seal(normalized.as_bytes())
    }

    /// Decrypts a base64 envelope produced under any key version.
    ///
    /// Returns the normalized plaintext. Every failure is reported as
    /// [`FieldError::DecryptionFailed`].
    pub fn decrypt(&self, envelope: &str) -> Result<String, FieldError> {
        let plaintext = self.open(&Envelope::decode(envelope)?)?;
        String::from_utf8(plaintext.to_vec()).map_err(|_| FieldError::DecryptionFailed)
    }

    /// Computes the hex lookup index of `plaintext` for equality search.
    pub fn lookup_index(&self, plaintext: &str) -> Result<String, FieldError> {
        let normalized = prepare(plaintext)?;
        self.digest(normalized.as_bytes())
    }

    /// Computes the lookup index of the value stored in an envelope.
    ///
    /// Equal to [`lookup_index`](Self::lookup_index) of the input that was
    /// encrypted. The length limit is not applied again to the stored value.
    pub fn index_envelope(&self, envelope: &str) -> Result<String, FieldError> {
        let plaintext = self.open(&Envelope::decode(envelope)?)?;
        self.digest(&plaintext)
    }

    /// Checks in constant time whether `index` is the lookup index of `plaintext`.
    ///
    /// A malformed `index` never matches.
    pub fn matches_index(&self, plaintext: &str, index: &str) -> Result<bool, FieldError> {
        let normalized = prepare(plaintext)?;
        let Ok(expected) = hex::decode(index.trim()) else {
            return Ok(false);
        };

        let key = self.keys.hmac_key()?;
        Ok(mac::verify_hmac_sha256(
            key.as_bytes(),
            normalized.as_bytes(),
            &expected,
        )?)
    }

    /// Reads the key version recorded in an envelope.
    ///
    /// Only the header is parsed; the envelope is not authenticated.
    pub fn envelope_version(&self, envelope: &str) -> Result<KeyVersion, FieldError> {
        Ok(Envelope::decode(envelope)?.version)
    }

    /// Re-encrypts an envelope under the active key version.
    ///
    /// The envelope is authenticated first. One already at the active version
    /// is returned unchanged. The stored plaintext is sealed as is, without
    /// normalizing or length-checking it again.
    pub fn rewrap(&self, envelope: &str) -> Result<String, FieldError> {
        let stored = Envelope::decode(envelope)?;
        let plaintext = self.open(&stored)?;

        if stored.version == self.active_version {
            return Ok(envelope.to_string());
        }

        let rewrapped = self.seal(&plaintext)?;
        debug!(from = %stored.version, to = %self.active_version, "Envelope rewrapped");

        Ok(rewrapped)
    }

    fn seal(&self, normalized: &[u8]) -> Result<String, FieldError> {
        let key = self.keys.pii_key(self.active_version)?;
        Ok(Envelope::seal(self.active_version, &key, normalized)?.encode())
    }

    /// Authenticates and decrypts; the plaintext must be UTF-8.
    fn open(&self, envelope: &Envelope) -> Result<Zeroizing<Vec<u8>>, FieldError> {
        let key = self
            .keys
            .pii_key(envelope.version)
            .map_err(|_| FieldError::DecryptionFailed)?;

        let plaintext = envelope.open(&key)?;
        std::str::from_utf8(&plaintext).map_err(|_| FieldError::DecryptionFailed)?;
        Ok(plaintext)
    }

    fn digest(&self, normalized: &[u8]) -> Result<String, FieldError> {
        let key = self.keys.hmac_key()?;
        let digest = mac::hmac_sha256(key.as_bytes(), normalized)?;
        Ok(hex::encode(digest))
    }
}
