//! Per-purpose key derivation with an in-process cache.
//!
//! Keys are derived with HKDF-SHA256 from the master secret:
//!
//! - PII keys: `info = pii_secret || decimal(version)`
//! - Lookup key: `info = hmac_secret` (no version, so the index stays stable
//!   across PII key rotations)
//!
//! Each `(purpose, version)` is derived once and memoized for the lifetime of
//! the key ring. Entries are never replaced or evicted.

use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;
use tracing::debug;
use zeroize::Zeroizing;

use ward_crypto::{kdf, DerivedKey, SecretMaterial};

use crate::error::FieldError;
use crate::version::KeyVersion;

/// What a derived key is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyPurpose {
    /// Envelope encryption under a given key version.
    Pii(KeyVersion),
    /// Lookup index hashing.
    Hmac,
}

impl fmt::Display for KeyPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pii(version) => write!(f, "pii_{version}"),
            Self::Hmac => write!(f, "hmac"),
        }
    }
}

/// Holds the root secrets and the memoized derived keys.
///
/// Safe to share between threads; concurrent first derivations of the same
/// purpose compute identical keys and the first insert wins.
pub struct KeyRing {
    master: SecretMaterial,
    salt: SecretMaterial,
    pii_secret: SecretMaterial,
    hmac_secret: SecretMaterial,
    cache: RwLock<HashMap<KeyPurpose, DerivedKey>>,
}

impl KeyRing {
    /// Creates a key ring from already validated secrets.
    ///
    /// Use [`FieldConfig::key_ring`](crate::FieldConfig::key_ring) to build
    /// one from configuration with validation.
    pub fn new(
        master: SecretMaterial,
        salt: SecretMaterial,
        pii_secret: SecretMaterial,
        hmac_secret: SecretMaterial,
    ) -> Self {
        Self {
            master,
            salt,
            pii_secret,
            hmac_secret,
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn purpose_material(&self, purpose: KeyPurpose) -> Zeroizing<Vec<u8>> {
        match purpose {
            KeyPurpose::Pii(version) => {
                let suffix = version.to_string();
                let mut info = Zeroizing::new(Vec::with_capacity(
                    self.pii_secret.len() + suffix.len(),
                ));
                info.extend_from_slice(self.pii_secret.as_bytes());
                info.extend_from_slice(suffix.as_bytes());
                info
            }
            KeyPurpose::Hmac => Zeroizing::new(self.hmac_secret.as_bytes().to_vec()),
        }
    }

    /// Returns the key for `purpose`, deriving it on first use.
    pub fn key(&self, purpose: KeyPurpose) -> Result<DerivedKey, FieldError> {
        if let Some(key) = self.cache.read().get(&purpose) {
            return Ok(key.clone());
        }

        let info = self.purpose_material(purpose);
        let derived = kdf::derive_256(self.master.as_bytes(), self.salt.as_bytes(), &info)?;

        let mut cache = self.cache.write();
        let key = cache.entry(purpose).or_insert(derived).clone();
        debug!(cache_key = %purpose, "Field key derived");

        Ok(key)
    }

    /// Returns the PII encryption key for `version`.
    pub fn pii_key(&self, version: KeyVersion) -> Result<DerivedKey, FieldError> {
        self.key(KeyPurpose::Pii(version))
    }

    /// Returns the lookup index key.
    pub fn hmac_key(&self) -> Result<DerivedKey, FieldError> {
        self.key(KeyPurpose::Hmac)
    }

    /// Number of keys derived so far.
    pub fn cached_keys(&self) -> usize {
        self.cache.read().len()
    }
}

impl fmt::Debug for KeyRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyRing")
            .field("secrets", &"[REDACTED]")
            .field("cached_keys", &self.cached_keys())
            .finish()
    }
}
