//! # Ward Service
//!
//! The crypt service that use-cases and repository adapters depend on.
//!
//! [`CryptService`] bundles the field cipher (encryption and lookup index)
//! with the password hasher behind one validated configuration. Build it once
//! at startup, wrap it in an `Arc`, and inject it wherever PII crosses the
//! persistence boundary.
//!
//! ## Operations
//!
//! - `encrypt_field` / `decrypt_field` - versioned envelopes for PII columns
//! - `lookup_index` / `index_field` - blind index for equality search on encrypted columns
//! - `hash_password` / `verify_password` - credential storage
//!
//! [`EmailMapper`] shows the intended use: it turns an email value object into
//! an encrypted column plus an indexed digest column, and back.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod mapper;

pub use config::ServiceConfig;
pub use error::ServiceError;
pub use mapper::{EmailAddress, EmailMapper, EmailRecord};

pub use ward_field::{normalize, FieldCipher, FieldConfig, KeyVersion, MAX_PLAINTEXT_CHARS};
pub use ward_password::PasswordHasher;

use tracing::info;

/// Field encryption, lookup hashing and password hashing.
#[derive(Debug, Clone)]
pub struct CryptService {
    fields: FieldCipher,
    passwords: PasswordHasher,
}

impl CryptService {
    /// Validates the whole configuration and builds the service.
    ///
    /// Fails on the first invalid secret or setting.
    pub fn new(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let fields = FieldCipher::new(&config.field)?;
        let passwords = PasswordHasher::new(config.password())?;

        info!(
            active_version = %fields.active_version(),
            work_factor = passwords.work_factor(),
            "Crypt service ready"
        );

        Ok(Self { fields, passwords })
    }

    /// Assembles a service from already built parts.
    pub fn from_parts(fields: FieldCipher, passwords: PasswordHasher) -> Self {
        Self { fields, passwords }
    }

    /// The field cipher.
    pub fn fields(&self) -> &FieldCipher {
        &self.fields
    }

    /// The password hasher.
    pub fn passwords(&self) -> &PasswordHasher {
        &self.passwords
    }

    /// Encrypts a PII value into a base64 envelope.
    pub fn encrypt_field(&self, plaintext: &str) -> Result<String, ServiceError> {
        Ok(self.fields.encrypt(plaintext)?)
    }

    /// Decrypts a base64 envelope into the normalized plaintext.
    pub fn decrypt_field(&self, envelope: &str) -> Result<String, ServiceError> {
        Ok(self.fields.decrypt(envelope)?)
    }

    /// Re-encrypts an envelope under the active key version.
    pub fn rewrap_field(&self, envelope: &str) -> Result<String, ServiceError> {
        Ok(self.fields.rewrap(envelope)?)
    }

    /// Computes the hex lookup index of a PII value.
    pub fn lookup_index(&self, plaintext: &str) -> Result<String, ServiceError> {
        Ok(self.fields.lookup_index(plaintext)?)
    }

    /// Recomputes the lookup index of a stored envelope, for rebuilding index columns.
    pub fn index_field(&self, envelope: &str) -> Result<String, ServiceError> {
        Ok(self.fields.index_envelope(envelope)?)
    }

    /// Hashes a password off the async executor.
    pub async fn hash_password(&self, raw: &str) -> Result<String, ServiceError> {
        Ok(self.passwords.hash_async(raw).await?)
    }

    /// Verifies a password off the async executor. A mismatch is `Ok(false)`.
    pub async fn verify_password(&self, raw: &str, hash: &str) -> Result<bool, ServiceError> {
        Ok(self.passwords.verify_async(raw, hash).await?)
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> ServiceConfig {
    serde_json::from_value(serde_json::json!({
        "master_key": "4d2f8a61c09b3e75d1a84f26b07c93e5",
        "derive_key": "c0ffee",
        "pii_secret": "a1b2c3d4e5f60718",
        "hmac_secret": "1827364554637281",
        "pii_key_version": 1,
        "password_work_factor": 10
    }))
    .unwrap()
}
