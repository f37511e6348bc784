//! Field encryption configuration.
//!
//! Secrets arrive as hex strings (environment variables, config files) and are
//! validated eagerly: a service built from an invalid configuration never
//! exists, so broken key material cannot silently produce weak ciphertexts.

use serde::Deserialize;
use ward_crypto::SecretMaterial;

use crate::error::FieldError;
use crate::keyring::KeyRing;
use crate::version::KeyVersion;

/// Minimum decoded length of the master key, in bytes.
pub const MIN_MASTER_KEY_LEN: usize = 16;

/// Minimum decoded length of the derivation salt, in bytes.
pub const MIN_DERIVE_KEY_LEN: usize = 1;

/// Minimum decoded length of the PII and HMAC purpose secrets, in bytes.
pub const MIN_PURPOSE_SECRET_LEN: usize = 8;

fn default_pii_key_version() -> u32 {
    1
}

/// Raw field encryption settings.
#[derive(Clone, Deserialize)]
pub struct FieldConfig {
    /// Master secret (hex), root of every derived key.
    pub master_key: String,
    /// HKDF salt (hex).
    pub derive_key: String,
    /// Purpose secret for PII encryption keys (hex).
    pub pii_secret: String,
    /// Purpose secret for the lookup index key (hex).
    pub hmac_secret: String,
    /// Key version used for new envelopes.
    #[serde(default = "default_pii_key_version")]
    pub pii_key_version: u32,
}

impl FieldConfig {
    /// Checks every setting without building anything.
    pub fn validate(&self) -> Result<(), FieldError> {
        self.active_version()?;
        self.key_ring()?;
        Ok(())
    }

    /// Returns the validated active PII key version.
    pub fn active_version(&self) -> Result<KeyVersion, FieldError> {
        KeyVersion::new(self.pii_key_version)
    }

    /// Decodes and validates the secrets into a key ring.
    pub fn key_ring(&self) -> Result<KeyRing, FieldError> {
        let master = decode_secret("master key", &self.master_key, MIN_MASTER_KEY_LEN, true)?;
        let salt = decode_secret("derive key", &self.derive_key, MIN_DERIVE_KEY_LEN, false)?;
        let pii = decode_secret("PII secret", &self.pii_secret, MIN_PURPOSE_SECRET_LEN, true)?;
        let hmac = decode_secret("HMAC secret", &self.hmac_secret, MIN_PURPOSE_SECRET_LEN, true)?;

        Ok(KeyRing::new(master, salt, pii, hmac))
    }
}

impl std::fmt::Debug for FieldConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldConfig")
            .field("master_key", &"[REDACTED]")
            .field("derive_key", &"[REDACTED]")
            .field("pii_secret", &"[REDACTED]")
            .field("hmac_secret", &"[REDACTED]")
            .field("pii_key_version", &self.pii_key_version)
            .finish()
    }
}

fn decode_secret(
    name: &str,
    encoded: &str,
    min_len: usize,
    reject_all_zero: bool,
) -> Result<SecretMaterial, FieldError> {
    if encoded.trim().is_empty() {
        return Err(FieldError::Configuration(format!("{name} is missing")));
    }

    let secret = SecretMaterial::from_hex(encoded)
        .map_err(|_| FieldError::Configuration(format!("{name} is not valid hex")))?;

    if secret.len() < min_len {
        return Err(FieldError::Configuration(format!(
            "{name} must be at least {min_len} bytes (got {})",
            secret.len()
        )));
    }

    if reject_all_zero && secret.is_all_zero() {
        return Err(FieldError::Configuration(format!(
            "{name} must not be all zero bytes"
        )));
    }

    Ok(secret)
}

#[cfg(test)]
pub(crate) fn test_config() -> FieldConfig {
    FieldConfig {
        master_key: "8f3a1c9e5b7d2f4061a8c3e9b5d7f2a4c6e8a0b2d4f6e8c0a2b4d6f8e0c2a4b6".into(),
        derive_key: "5a17c0de".into(),
        pii_secret: "7e1f2a3b4c5d6e7f".into(),
        hmac_secret: "0123456789abcdef".into(),
        pii_key_version: 1,
    }
}
