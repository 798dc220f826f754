// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Key management clients.
//!
//! A [`KmsClient`] wraps data encryption keys under master keys identified by
//! name. [`InMemoryKmsClient`] is a mock for testing only: the "wrapped" key
//! is the master key concatenated with the key bytes, base64 encoded. It
//! checks integrity (the right master key was used) and offers no
//! confidentiality at all.

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::KmsError;
use crate::types::{KeyId, MasterKey, MASTER_KEY_LEN};

/// Wraps and unwraps data keys under named master keys.
pub trait KmsClient: Send + Sync {
    fn wrap_key(&self, key_bytes: &[u8], master_key_identifier: &str) -> Result<String, KmsError>;

    fn unwrap_key(&self, wrapped_key: &str, master_key_identifier: &str)
        -> Result<Vec<u8>, KmsError>;
}

/// Connection settings handed to a KMS client factory.
#[derive(Debug, Clone, Default)]
pub struct KmsConnectionConfig {
    /// Master key material by key identifier
    pub custom_kms_conf: HashMap<KeyId, MasterKey>,
}

impl KmsConnectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_master_key(mut self, key_id: KeyId, key: MasterKey) -> Self {
        self.custom_kms_conf.insert(key_id, key);
        self
    }
}

/// Mock KMS client holding master keys in memory.
#[derive(Debug, Clone)]
pub struct InMemoryKmsClient {
    master_keys_map: HashMap<String, Vec<u8>>,
}

impl InMemoryKmsClient {
    pub fn new(config: &KmsConnectionConfig) -> Self {
        let master_keys_map = config
            .custom_kms_conf
            .iter()
            .map(|(id, key)| (id.as_str().to_string(), key.as_str().as_bytes().to_vec()))
            .collect();
        Self { master_keys_map }
    }

    fn master_key(&self, master_key_identifier: &str) -> Result<&[u8], KmsError> {
        self.master_keys_map
            .get(master_key_identifier)
            .map(Vec::as_slice)
            .ok_or_else(|| KmsError::UnknownMasterKey {
                key_id: master_key_identifier.to_string(),
            })
    }
}

impl KmsClient for InMemoryKmsClient {
    fn wrap_key(&self, key_bytes: &[u8], master_key_identifier: &str) -> Result<String, KmsError> {
        let master_key_bytes = self.master_key(master_key_identifier)?;
        let mut wrapped = Vec::with_capacity(master_key_bytes.len() + key_bytes.len());
        wrapped.extend_from_slice(master_key_bytes);
        wrapped.extend_from_slice(key_bytes);
        Ok(STANDARD.encode(wrapped))
    }

    fn unwrap_key(
        &self,
        wrapped_key: &str,
        master_key_identifier: &str,
    ) -> Result<Vec<u8>, KmsError> {
        let expected_master_key = self.master_key(master_key_identifier)?;
        let mut decoded = STANDARD.decode(wrapped_key)?;
        if decoded.len() < MASTER_KEY_LEN {
            return Err(KmsError::TruncatedKey {
                len: decoded.len(),
                min: MASTER_KEY_LEN,
            });
        }

        // No length field: the master key always occupies the first 16 bytes.
        let key = decoded.split_off(MASTER_KEY_LEN);
        if decoded.as_slice() == expected_master_key {
            Ok(key)
        } else {
            Err(KmsError::IncorrectMasterKey {
                master_key: decoded,
                key,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOOTER_KEY: &str = "0123456789112345";
    const COL_KEY: &str = "1234567890123450";

    fn client() -> InMemoryKmsClient {
        let footer_id = KeyId::new("footer_key").unwrap();
        let col_id = KeyId::new("col_key").unwrap();
        let config = KmsConnectionConfig::new()
            .with_master_key(footer_id.clone(), MasterKey::new(&footer_id, FOOTER_KEY).unwrap())
            .with_master_key(col_id.clone(), MasterKey::new(&col_id, COL_KEY).unwrap());
        InMemoryKmsClient::new(&config)
    }

    #[test]
    fn test_wrap_unwrap_roundtrip() {
        let kms = client();
        for key in [b"".to_vec(), b"abc".to_vec(), vec![0u8; 32], (0..=255).collect()] {
            let wrapped = kms.wrap_key(&key, "col_key").unwrap();
            assert_eq!(kms.unwrap_key(&wrapped, "col_key").unwrap(), key);
        }
    }

    #[test]
    fn test_wrapped_format_is_master_then_key() {
        let kms = client();
        let wrapped = kms.wrap_key(b"data-key", "footer_key").unwrap();
        let decoded = STANDARD.decode(wrapped).unwrap();
        assert_eq!(&decoded[..16], FOOTER_KEY.as_bytes());
        assert_eq!(&decoded[16..], b"data-key");
    }

    #[test]
    fn test_unwrap_with_other_id_fails() {
        let kms = client();
        let wrapped = kms.wrap_key(b"secret", "footer_key").unwrap();

        match kms.unwrap_key(&wrapped, "col_key") {
            Err(KmsError::IncorrectMasterKey { master_key, key }) => {
                assert_eq!(master_key, FOOTER_KEY.as_bytes());
                assert_eq!(key, b"secret");
            }
            other => panic!("expected IncorrectMasterKey, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_key_id() {
        let kms = client();
        assert!(matches!(
            kms.wrap_key(b"k", "missing"),
            Err(KmsError::UnknownMasterKey { .. })
        ));
    }

    #[test]
    fn test_unwrap_rejects_garbage() {
        let kms = client();
        assert!(matches!(
            kms.unwrap_key("not base64!", "col_key"),
            Err(KmsError::InvalidEncoding(_))
        ));
        let short = STANDARD.encode(b"tiny");
        assert!(matches!(
            kms.unwrap_key(&short, "col_key"),
            Err(KmsError::TruncatedKey { len: 4, .. })
        ));
    }

    #[test]
    fn test_unwrap_accepts_bare_master_key() {
        let kms = client();
        let wrapped = STANDARD.encode(COL_KEY);
        assert_eq!(kms.unwrap_key(&wrapped, "col_key").unwrap(), Vec::<u8>::new());
    }
}
