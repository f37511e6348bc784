//! # Ward Password
//!
//! Salted, adaptive, one-way password hashing for credential storage.
//!
//! Hashes are Argon2id PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`)
//! with a random salt per call. Passwords are hashed exactly as given: no
//! trimming and no case folding.
//!
//! ## Work Factor
//!
//! The cost is expressed as a single work factor `w`: memory cost is `2^w` KiB,
//! so each increment doubles the work. The factor must lie in
//! `MIN_WORK_FACTOR..=MAX_WORK_FACTOR`.
//!
//! Hashing is deliberately slow. Async callers should use
//! [`PasswordHasher::hash_async`] and [`PasswordHasher::verify_async`], which
//! run on Tokio's blocking pool.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;

pub use error::PasswordError;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use serde::Deserialize;
use tracing::{info, warn};

/// Smallest accepted work factor (1 MiB of memory).
pub const MIN_WORK_FACTOR: u32 = 10;

/// Largest accepted work factor (1 GiB of memory).
pub const MAX_WORK_FACTOR: u32 = 20;

/// Work factor used when none is configured (32 MiB of memory).
pub const DEFAULT_WORK_FACTOR: u32 = 15;

/// Argon2 passes over memory.
const TIME_COST: u32 = 2;

/// Argon2 lanes.
const PARALLELISM: u32 = 1;

fn default_work_factor() -> u32 {
    DEFAULT_WORK_FACTOR
}

/// Password hashing settings.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PasswordConfig {
    /// Cost exponent: memory cost is `2^work_factor` KiB.
    #[serde(default = "default_work_factor")]
    pub work_factor: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            work_factor: DEFAULT_WORK_FACTOR,
        }
    }
}

/// Hashes and verifies passwords.
///
/// Cheap to clone; clones share nothing mutable.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    work_factor: u32,
}

impl PasswordHasher {
    /// Validates the work factor and creates a hasher.
    pub fn new(config: PasswordConfig) -> Result<Self, PasswordError> {
        let work_factor = config.work_factor;
        if !(MIN_WORK_FACTOR..=MAX_WORK_FACTOR).contains(&work_factor) {
            return Err(PasswordError::Configuration(format!(
                "password work factor must be between {MIN_WORK_FACTOR} and {MAX_WORK_FACTOR} (got {work_factor})"
            )));
        }

        let params = Params::new(1 << work_factor, TIME_COST, PARALLELISM, None)
            .map_err(|e| PasswordError::Configuration(format!("invalid Argon2 params: {e}")))?;

        info!(work_factor, memory_kib = params.m_cost(), "Password hasher initialized");

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            work_factor,
        })
    }

    /// Configured work factor.
    pub fn work_factor(&self) -> u32 {
        self.work_factor
    }

    /// Hashes `password` with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::Hashing(e.to_string()))
    }

    /// Checks `password` against a stored hash.
    ///
    /// Returns `false` on mismatch and on a malformed stored hash.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "Stored password hash is malformed");
                return false;
            }
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// True when `hash` should be recomputed with the current settings.
    ///
    /// That is the case for hashes from another algorithm, with a lower
    /// memory or time cost, or that cannot be parsed.
    pub fn needs_rehash(&self, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return true;
        };

        if parsed.algorithm != Algorithm::Argon2id.ident() {
            return true;
        }

        let current = self.argon2.params();
        match Params::try_from(&parsed) {
            Ok(stored) => stored.m_cost() < current.m_cost() || stored.t_cost() < current.t_cost(),
            Err(_) => true,
        }
    }

    /// Runs [`hash`](Self::hash) on the blocking thread pool.
    pub async fn hash_async(&self, password: &str) -> Result<String, PasswordError> {
        let hasher = self.clone();
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| PasswordError::Worker(e.to_string()))?
    }

    /// Runs [`verify`](Self::verify) on the blocking thread pool.
    pub async fn verify_async(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let hasher = self.clone();
        let password = password.to_owned();
        let hash = hash.to_owned();

        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| PasswordError::Worker(e.to_string()))
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("algorithm", &"argon2id")
            .field("work_factor", &self.work_factor)
            .finish()
    }
}
