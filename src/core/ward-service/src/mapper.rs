//! Email persistence mapper.
//!
//! Converts the email value object to and from its persisted shape: an
//! encrypted envelope column plus a lookup digest column carrying a unique
//! index. Repositories search by email through the digest without decrypting
//! any rows.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::CryptService;

/// Longest accepted email address, in characters.
pub const MAX_EMAIL_LEN: usize = 254;

/// A syntactically valid email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Trims and validates `raw`.
    ///
    /// Requires exactly one `@` with non-empty local and domain parts, no
    /// inner whitespace, and at most [`MAX_EMAIL_LEN`] characters.
    pub fn parse(raw: &str) -> Result<Self, ServiceError> {
        let value = raw.trim();

        if value.is_empty() {
            return Err(ServiceError::InvalidEmail("email cannot be empty".into()));
        }
        if value.chars().count() > MAX_EMAIL_LEN {
            return Err(ServiceError::InvalidEmail(format!(
                "email too long (max {MAX_EMAIL_LEN} chars)"
            )));
        }
        if value.chars().any(char::is_whitespace) {
            return Err(ServiceError::InvalidEmail(
                "email cannot contain whitespace".into(),
            ));
        }

        match value.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
                Ok(Self(value.to_string()))
            }
            _ => Err(ServiceError::InvalidEmail(
                "email must have the form local@domain".into(),
            )),
        }
    }

    /// The address as given (trimmed).
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persisted columns for an email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailRecord {
    /// Base64 envelope of the normalized address.
    pub email_encrypted: String,
    /// Hex lookup digest of the normalized address.
    pub email_hash: String,
}

/// Maps [`EmailAddress`] values to [`EmailRecord`] rows and back.
#[derive(Debug, Clone)]
pub struct EmailMapper {
    crypt: Arc<CryptService>,
}

impl EmailMapper {
    /// Creates a mapper over a shared crypt service.
    pub fn new(crypt: Arc<CryptService>) -> Self {
        Self { crypt }
    }

    /// Builds the persisted row for `email`.
    pub fn to_record(&self, email: &EmailAddress) -> Result<EmailRecord, ServiceError> {
        Ok(EmailRecord {
            email_encrypted: self.crypt.encrypt_field(email.as_str())?,
            email_hash: self.crypt.lookup_index(email.as_str())?,
        })
    }

    /// Restores the value object from a persisted row.
    ///
    /// The result is the normalized (lowercase) address.
    pub fn to_domain(&self, record: &EmailRecord) -> Result<EmailAddress, ServiceError> {
        let plaintext = self.crypt.decrypt_field(&record.email_encrypted)?;
        EmailAddress::parse(&plaintext)
    }

    /// Digest to compare against the indexed column when searching by email.
    pub fn lookup_hash(&self, raw: &str) -> Result<String, ServiceError> {
        let email = EmailAddress::parse(raw)?;
        self.crypt.lookup_index(email.as_str())
    }

    /// True when `record` stores the address `raw`, compared through the digest.
    pub fn matches(&self, record: &EmailRecord, raw: &str) -> Result<bool, ServiceError> {
        let email = EmailAddress::parse(raw)?;
        Ok(self
            .crypt
            .fields()
            .matches_index(email.as_str(), &record.email_hash)?)
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::test_config;

    fn mapper() -> EmailMapper {
        EmailMapper::new(Arc::new(CryptService::new(&test_config()).unwrap()))
    }

    #[test]
    fn test_parse_valid() {
        let email = EmailAddress::parse("  Jane.Doe@Example.com ").unwrap();
        assert_eq!(email.as_str(), "Jane.Doe@Example.com");
        assert_eq!(email.to_string(), "Jane.Doe@Example.com");
    }

    #[test]
    fn test_parse_invalid() {
        for raw in ["", "   ", "no-at-sign", "@example.com", "jane@", "a@b@c", "jane doe@example.com"] {
            assert!(
                matches!(EmailAddress::parse(raw), Err(ServiceError::InvalidEmail(_))),
                "accepted {raw:?}"
            );
        }

        let long = format!("{}@example.com", "a".repeat(MAX_EMAIL_LEN));
        assert!(matches!(EmailAddress::parse(&long), Err(ServiceError::InvalidEmail(_))));
    }

    #[test]
    fn test_record_roundtrip_normalizes() {
        let mapper = mapper();
        let email = EmailAddress::parse("Jane@Example.com").unwrap();

        let record = mapper.to_record(&email).unwrap();
        let restored = mapper.to_domain(&record).unwrap();

        assert_eq!(restored.as_str(), "jane@example.com");
    }

    #[test]
    fn test_lookup_hash_matches_stored_hash() {
        let mapper = mapper();
        let record = mapper
            .to_record(&EmailAddress::parse("Jane@Example.com").unwrap())
            .unwrap();

        assert_eq!(mapper.lookup_hash(" jane@example.COM").unwrap(), record.email_hash);
        assert!(mapper.matches(&record, "JANE@example.com").unwrap());
        assert!(!mapper.matches(&record, "john@example.com").unwrap());
    }

    #[test]
    fn test_lookup_hash_rejects_invalid_email() {
        assert!(matches!(mapper().lookup_hash("nope"), Err(ServiceError::InvalidEmail(_))));
    }

    #[test]
    fn test_tampered_record_fails() {
        let mapper = mapper();
        let mut record = mapper
            .to_record(&EmailAddress::parse("jane@example.com").unwrap())
            .unwrap();
        record.email_encrypted = record.email_encrypted.chars().rev().collect();

        assert!(mapper.to_domain(&record).is_err());
    }

    #[test]
    fn test_record_serializes_as_columns() {
        let mapper = mapper();
        let record = mapper
            .to_record(&EmailAddress::parse("jane@example.com").unwrap())
            .unwrap();

        let json = serde_json::to_value(&record).unwrap();
        assert!(json["email_encrypted"].is_string());
        assert_eq!(json["email_hash"].as_str().unwrap().len(), 64);

        let back: EmailRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
