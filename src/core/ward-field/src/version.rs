//! PII key versions.

use std::fmt;

use crate::error::FieldError;

/// Version of the PII encryption key, in `1..=255`.
///
/// Stored as the first byte of every envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyVersion(u8);

impl KeyVersion {
    /// The initial key version.
    pub const FIRST: Self = Self(1);

    /// Validates a configured version number.
    pub fn new(version: u32) -> Result<Self, FieldError> {
        match u8::try_from(version) {
            Ok(v) if v >= 1 => Ok(Self(v)),
            _ => Err(FieldError::Configuration(format!(
                "PII key version must be between 1 and 255 (got {version})"
            ))),
        }
    }

    /// Reads a version from an envelope byte. Zero is not a valid version.
    pub fn from_byte(byte: u8) -> Option<Self> {
        (byte != 0).then_some(Self(byte))
    }

    /// Returns the version as the byte written into envelopes.
    #[inline]
    pub fn as_u8(self) -> u8 {
        self.0
    }
}

impl Default for KeyVersion {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for KeyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_range() {
        assert_eq!(KeyVersion::new(1).unwrap().as_u8(), 1);
        assert_eq!(KeyVersion::new(255).unwrap().as_u8(), 255);
    }

    #[test]
    fn test_out_of_range() {
        assert!(matches!(KeyVersion::new(0), Err(FieldError::Configuration(_))));
        assert!(matches!(KeyVersion::new(256), Err(FieldError::Configuration(_))));
    }

    #[test]
    fn test_from_byte() {
        assert_eq!(KeyVersion::from_byte(0), None);
        assert_eq!(KeyVersion::from_byte(7), Some(KeyVersion(7)));
    }

    #[test]
    fn test_display_is_decimal() {
        assert_eq!(KeyVersion::new(12).unwrap().to_string(), "12");
    }
}
