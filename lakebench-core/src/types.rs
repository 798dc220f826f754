// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Newtype wrappers for validated inputs.
//!
//! All types validate their invariants at creation time.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::HardValidationError;

/// Length in bytes of every master key understood by the in-memory KMS.
pub const MASTER_KEY_LEN: usize = 16;

/// Shape of a synthetic dataset. Both dimensions are non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DataShape {
    nrows: usize,
    ncols: usize,
}

impl DataShape {
    /// Create a new shape, rejecting empty dimensions.
    pub fn new(nrows: usize, ncols: usize) -> Result<Self, HardValidationError> {
        if nrows == 0 {
            return Err(HardValidationError::InvalidFieldValue {
                field: "nrows",
                value: nrows.to_string(),
                reason: "Row count must be greater than 0".to_string(),
            });
        }
        if ncols == 0 {
            return Err(HardValidationError::InvalidFieldValue {
                field: "ncols",
                value: ncols.to_string(),
                reason: "Column count must be greater than 0".to_string(),
            });
        }
        Ok(Self { nrows, ncols })
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }
}

impl fmt::Display for DataShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.nrows, self.ncols)
    }
}

/// One point of the benchmark grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrialParams {
    pub shape: DataShape,
    /// Number of append writes after the creating write
    pub nappend: usize,
}

impl TrialParams {
    pub fn new(shape: DataShape, nappend: usize) -> Self {
        Self { shape, nappend }
    }

    /// Rows the table holds once every write of the trial has committed.
    pub fn expected_rows(&self) -> usize {
        self.shape.nrows() * (self.nappend + 1)
    }
}

/// Validated key identifier.
/// Must be non-empty, alphanumeric with hyphens/underscores, max 64 chars.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyId(String);

impl KeyId {
    /// Create a new KeyId with validation.
    pub fn new(id: impl Into<String>) -> Result<Self, HardValidationError> {
        let id = id.into();

        if id.is_empty() {
            return Err(HardValidationError::InvalidFieldValue {
                field: "key_id",
                value: id,
                reason: "Key ID cannot be empty".to_string(),
            });
        }

        if id.len() > 64 {
            return Err(HardValidationError::InvalidFieldValue {
                field: "key_id",
                value: id.clone(),
                reason: format!("Key ID too long: {} chars (max 64)", id.len()),
            });
        }

        if !id
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            return Err(HardValidationError::InvalidFieldValue {
                field: "key_id",
                value: id,
                reason: "Key ID must contain only alphanumeric characters, hyphens, and underscores"
                    .to_string(),
            });
        }

        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for KeyId {
    type Error = HardValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<KeyId> for String {
    fn from(id: KeyId) -> Self {
        id.0
    }
}

/// Master key material: a UTF-8 string of exactly [`MASTER_KEY_LEN`] bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct MasterKey(String);

impl MasterKey {
    pub fn new(key_id: &KeyId, key: impl Into<String>) -> Result<Self, HardValidationError> {
        let key = key.into();
        if key.len() != MASTER_KEY_LEN {
            return Err(HardValidationError::InvalidKeyLength {
                key_id: key_id.to_string(),
                len: key.len(),
                expected: MASTER_KEY_LEN,
            });
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Key material stays out of logs.
impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKey(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_valid() {
        let shape = DataShape::new(100, 20).unwrap();
        assert_eq!(shape.nrows(), 100);
        assert_eq!(shape.ncols(), 20);
        assert_eq!(shape.to_string(), "100x20");
    }

    #[test]
    fn test_shape_rejects_zero() {
        assert!(DataShape::new(0, 20).is_err());
        assert!(DataShape::new(100, 0).is_err());
    }

    #[test]
    fn test_expected_rows() {
        let params = TrialParams::new(DataShape::new(209_716, 20).unwrap(), 1);
        assert_eq!(params.expected_rows(), 419_432);
    }

    #[test]
    fn test_key_id_valid() {
        assert!(KeyId::new("footer_key").is_ok());
        assert!(KeyId::new("col-key-1").is_ok());
    }

    #[test]
    fn test_key_id_invalid() {
        assert!(KeyId::new("").is_err());
        assert!(KeyId::new("has space").is_err());
        assert!(KeyId::new("a".repeat(65)).is_err());
    }

    #[test]
    fn test_master_key_length() {
        let id = KeyId::new("footer_key").unwrap();
        assert!(MasterKey::new(&id, "0123456789112345").is_ok());
        assert!(MasterKey::new(&id, "short").is_err());
        assert!(MasterKey::new(&id, "01234567891123456").is_err());
    }

    #[test]
    fn test_master_key_debug_is_redacted() {
        let id = KeyId::new("footer_key").unwrap();
        let key = MasterKey::new(&id, "0123456789112345").unwrap();
        assert!(!format!("{:?}", key).contains("0123"));
    }
}
