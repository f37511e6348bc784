//! Crypt service configuration.

use serde::Deserialize;

use ward_field::FieldConfig;
use ward_password::{PasswordConfig, DEFAULT_WORK_FACTOR};

fn default_work_factor() -> u32 {
    DEFAULT_WORK_FACTOR
}

/// Complete configuration for [`CryptService`](crate::CryptService).
///
/// Field names match the flat key layout of a config file section or the
/// `WARD_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Field encryption secrets and active key version.
    #[serde(flatten)]
    pub field: FieldConfig,

    /// Password hashing work factor.
    #[serde(default = "default_work_factor")]
    pub password_work_factor: u32,
}

impl ServiceConfig {
    /// Password hasher settings.
    pub fn password(&self) -> PasswordConfig {
        PasswordConfig {
            work_factor: self.password_work_factor,
        }
    }
}
