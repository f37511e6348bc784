//! Integration tests for Ward.
//!
//! These tests drive the crypt service the way a backend does: build it once
//! from configuration, share it behind an `Arc`, persist envelopes and lookup
//! digests, rotate the PII key version, and hash credentials.

// Allow unwrap() in tests - panics are acceptable for test assertions
#![allow(clippy::disallowed_methods)]

use std::collections::HashMap;

use anyhow::{bail, Result};
use ward_crypto::random::generate_token;
use ward_service::{
    CryptService, EmailAddress, EmailMapper, EmailRecord, FieldConfig, ServiceConfig,
};

// ============================================================================
// Fixtures
// ============================================================================

/// Freshly generated secrets with the cheapest allowed password cost.
pub fn random_config(pii_key_version: u32) -> ServiceConfig {
    ServiceConfig {
        field: FieldConfig {
            master_key: generate_token(32),
            derive_key: generate_token(16),
            pii_secret: generate_token(16),
            hmac_secret: generate_token(16),
            pii_key_version,
        },
        password_work_factor: 10,
    }
}

/// Same secrets as `config`, different active key version.
pub fn rotated(config: &ServiceConfig, pii_key_version: u32) -> ServiceConfig {
    let mut next = config.clone();
    next.field.pii_key_version = pii_key_version;
    next
}

// ============================================================================
// In-Memory User Repository
// ============================================================================

/// A stored user row: encrypted email, unique email digest, password hash.
#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: u64,
    pub email: EmailRecord,
    pub password_hash: String,
}

/// Stand-in for a table with a unique index on the email digest column.
#[derive(Default)]
pub struct UserTable {
    rows: HashMap<u64, UserRow>,
    by_email_hash: HashMap<String, u64>,
    next_id: u64,
}

impl UserTable {
    pub fn insert(&mut self, email: EmailRecord, password_hash: String) -> Result<u64> {
        if self.by_email_hash.contains_key(&email.email_hash) {
            bail!("duplicate email");
        }

        self.next_id += 1;
        let id = self.next_id;
        self.by_email_hash.insert(email.email_hash.clone(), id);
        self.rows.insert(
            id,
            UserRow {
                id,
                email,
                password_hash,
            },
        );
        Ok(id)
    }

    pub fn find_by_email_hash(&self, hash: &str) -> Option<&UserRow> {
        self.by_email_hash.get(hash).and_then(|id| self.rows.get(id))
    }

    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut UserRow> {
        self.rows.values_mut()
    }
}

/// Registration use-case: map the email, hash the password, insert.
pub async fn register(
    crypt: &CryptService,
    mapper: &EmailMapper,
    users: &mut UserTable,
    email: &str,
    password: &str,
) -> Result<u64> {
    let email = EmailAddress::parse(email)?;
    let record = mapper.to_record(&email)?;
    let password_hash = crypt.hash_password(password).await?;
    users.insert(record, password_hash)
}

/// Login use-case: find by digest, verify password.
pub async fn login(
    crypt: &CryptService,
    mapper: &EmailMapper,
    users: &UserTable,
    email: &str,
    password: &str,
) -> Result<Option<u64>> {
    let hash = mapper.lookup_hash(email)?;
    let Some(user) = users.find_by_email_hash(&hash) else {
        return Ok(None);
    };

    if crypt.verify_password(password, &user.password_hash).await? {
        Ok(Some(user.id))
    } else {
        Ok(None)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
    use ward_service::{ServiceError, MAX_PLAINTEXT_CHARS};

    fn service(config: &ServiceConfig) -> Arc<CryptService> {
        Arc::new(CryptService::new(config).unwrap())
    }

    #[tokio::test]
    async fn test_register_and_login_flow() {
        let crypt = service(&random_config(1));
        let mapper = EmailMapper::new(Arc::clone(&crypt));
        let mut users = UserTable::default();

        let id = register(&crypt, &mapper, &mut users, " Jane@Example.com", "hunter2")
            .await
            .unwrap();

        assert_eq!(
            login(&crypt, &mapper, &users, "jane@example.com ", "hunter2")
                .await
                .unwrap(),
            Some(id)
        );
        assert_eq!(
            login(&crypt, &mapper, &users, "JANE@EXAMPLE.COM", "Hunter2")
                .await
                .unwrap(),
            None
        );
        assert_eq!(
            login(&crypt, &mapper, &users, "john@example.com", "hunter2")
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_unique_index_rejects_case_variants() {
        let crypt = service(&random_config(1));
        let mapper = EmailMapper::new(Arc::clone(&crypt));
        let mut users = UserTable::default();

        register(&crypt, &mapper, &mut users, "jane@example.com", "a")
            .await
            .unwrap();
        let duplicate = register(&crypt, &mapper, &mut users, "JANE@example.com ", "b").await;

        assert!(duplicate.is_err());
    }

    #[tokio::test]
    async fn test_rotation_with_stored_rows() {
        let config = random_config(1);
        let crypt_v1 = service(&config);
        let mapper_v1 = EmailMapper::new(Arc::clone(&crypt_v1));
        let mut users = UserTable::default();

        let id = register(&crypt_v1, &mapper_v1, &mut users, "jane@example.com", "pw")
            .await
            .unwrap();

        // Restart with the next key version
        let crypt_v2 = service(&rotated(&config, 2));
        let mapper_v2 = EmailMapper::new(Arc::clone(&crypt_v2));

        // Lookup digests are version independent
        assert_eq!(
            login(&crypt_v2, &mapper_v2, &users, "jane@example.com", "pw")
                .await
                .unwrap(),
            Some(id)
        );

        // Old envelopes still decrypt, then get upgraded in place
        for row in users.rows_mut() {
            let stored = &row.email.email_encrypted;
            assert_eq!(crypt_v2.fields().envelope_version(stored).unwrap().as_u8(), 1);
            row.email.email_encrypted = crypt_v2.rewrap_field(stored).unwrap();
        }

        let user = users
            .find_by_email_hash(&mapper_v2.lookup_hash("jane@example.com").unwrap())
            .unwrap();
        assert_eq!(
            crypt_v2.fields().envelope_version(&user.email.email_encrypted).unwrap().as_u8(),
            2
        );
        assert_eq!(
            mapper_v2.to_domain(&user.email).unwrap().as_str(),
            "jane@example.com"
        );

        // Any service holding the same secrets derives every version on demand
        assert_eq!(
            crypt_v1.decrypt_field(&user.email.email_encrypted).unwrap(),
            "jane@example.com"
        );
    }

    #[test]
    fn test_different_deployments_are_isolated() {
        let a = service(&random_config(1));
        let b = service(&random_config(1));

        let envelope = a.encrypt_field("jane@example.com").unwrap();
        assert!(matches!(b.decrypt_field(&envelope), Err(ServiceError::DecryptionFailed)));
        assert_ne!(
            a.lookup_index("jane@example.com").unwrap(),
            b.lookup_index("jane@example.com").unwrap()
        );
    }

    #[test]
    fn test_tampering_never_returns_plaintext() {
        let crypt = service(&random_config(1));
        let envelope = crypt.encrypt_field("4111 1111 1111 1111").unwrap();
        let bytes = BASE64.decode(&envelope).unwrap();

        for i in 0..bytes.len() {
            let mut tampered = bytes.clone();
            tampered[i] = tampered[i].wrapping_add(1);

            let result = crypt.decrypt_field(&BASE64.encode(&tampered));
            assert!(
                matches!(result, Err(ServiceError::DecryptionFailed)),
                "byte {i} tamper not detected"
            );
        }

        let truncated = BASE64.encode(&bytes[..bytes.len() - 1]);
        assert!(matches!(crypt.decrypt_field(&truncated), Err(ServiceError::DecryptionFailed)));
    }

    #[test]
    fn test_boundary_lengths() {
        let crypt = service(&random_config(1));

        let at_limit = "A".repeat(MAX_PLAINTEXT_CHARS);
        let envelope = crypt.encrypt_field(&at_limit).unwrap();
        assert_eq!(crypt.decrypt_field(&envelope).unwrap(), at_limit.to_lowercase());

        let over = "A".repeat(MAX_PLAINTEXT_CHARS + 1);
        assert!(matches!(crypt.encrypt_field(&over), Err(ServiceError::InputTooLarge { .. })));
        assert!(matches!(crypt.lookup_index(&over), Err(ServiceError::InputTooLarge { .. })));
    }

    #[test]
    fn test_invalid_configuration_never_builds() {
        let mut config = random_config(1);
        config.field.master_key = "ab".repeat(15);
        assert!(matches!(CryptService::new(&config), Err(ServiceError::Configuration(_))));

        let mut config = random_config(1);
        config.field.pii_secret = "00".repeat(16);
        assert!(matches!(CryptService::new(&config), Err(ServiceError::Configuration(_))));

        let mut config = random_config(1);
        config.password_work_factor = 9;
        assert!(matches!(CryptService::new(&config), Err(ServiceError::Configuration(_))));

        let config = random_config(0);
        assert!(matches!(CryptService::new(&config), Err(ServiceError::Configuration(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_use_of_shared_service() {
        let crypt = service(&random_config(1));
        let expected_index = crypt.lookup_index("shared@example.com").unwrap();

        let mut handles = Vec::new();
        for i in 0..32 {
            let crypt = Arc::clone(&crypt);
            let expected_index = expected_index.clone();
            handles.push(tokio::spawn(async move {
                let value = format!("user-{i}@example.com");
                let envelope = crypt.encrypt_field(&value).unwrap();
                assert_eq!(crypt.decrypt_field(&envelope).unwrap(), value);
                assert_eq!(crypt.lookup_index("Shared@Example.com").unwrap(), expected_index);
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(crypt.fields().key_ring().cached_keys(), 2);
    }
}
