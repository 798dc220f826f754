// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Parquet modular encryption driven by a KMS client.
//!
//! Envelope encryption: each written file gets fresh random data keys, one for
//! the footer and one per column key identifier. Data keys are wrapped by the
//! KMS under the named master keys and the wrapped form is stored in the file
//! as JSON key material. On read, a [`KmsKeyRetriever`] parses the key
//! material and asks the KMS to unwrap it.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use parquet::encryption::decrypt::{FileDecryptionProperties, KeyRetriever};
use parquet::encryption::encrypt::FileEncryptionProperties;
use parquet::errors::ParquetError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HardValidationError, KmsError, LakeResult};
use crate::kms::{InMemoryKmsClient, KmsClient, KmsConnectionConfig};
use crate::types::KeyId;

/// Key material format tag written into every key metadata blob.
const KEY_MATERIAL_TYPE: &str = "PKMT1";

/// Data key lengths accepted by AES-GCM, in bits.
pub const SUPPORTED_DATA_KEY_BITS: [u32; 3] = [128, 192, 256];

const DEFAULT_CACHE_LIFETIME: Duration = Duration::from_secs(300);

/// Which master keys protect which parts of a file.
#[derive(Debug, Clone)]
pub struct EncryptionConfiguration {
    footer_key: KeyId,
    column_keys: BTreeMap<KeyId, Vec<String>>,
    data_key_length_bits: u32,
}

impl EncryptionConfiguration {
    pub fn new(footer_key: KeyId) -> Self {
        Self {
            footer_key,
            column_keys: BTreeMap::new(),
            data_key_length_bits: 128,
        }
    }

    /// Protect `columns` with the master key `key_id`.
    pub fn with_column_key(mut self, key_id: KeyId, columns: Vec<String>) -> Self {
        self.column_keys.entry(key_id).or_default().extend(columns);
        self
    }

    pub fn with_data_key_length_bits(mut self, bits: u32) -> Result<Self, HardValidationError> {
        if !SUPPORTED_DATA_KEY_BITS.contains(&bits) {
            return Err(HardValidationError::InvalidFieldValue {
                field: "data_key_length_bits",
                value: bits.to_string(),
                reason: "Must be one of 128, 192 or 256".to_string(),
            });
        }
        self.data_key_length_bits = bits;
        Ok(self)
    }

    pub fn footer_key(&self) -> &KeyId {
        &self.footer_key
    }

    pub fn column_keys(&self) -> &BTreeMap<KeyId, Vec<String>> {
        &self.column_keys
    }

    fn data_key_len(&self) -> usize {
        (self.data_key_length_bits / 8) as usize
    }

    /// A column may be protected by at most one key.
    fn validate(&self) -> Result<(), HardValidationError> {
        let mut seen = HashSet::new();
        for (key_id, columns) in &self.column_keys {
            for column in columns {
                if !seen.insert(column.as_str()) {
                    return Err(HardValidationError::SchemaValidation {
                        message: format!(
                            "Column '{}' is assigned to more than one key (last: {})",
                            column, key_id
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Read-side settings.
#[derive(Debug, Clone)]
pub struct DecryptionConfiguration {
    /// How long an unwrapped data key may be reused without asking the KMS
    pub cache_lifetime: Duration,
}

impl Default for DecryptionConfiguration {
    fn default() -> Self {
        Self {
            cache_lifetime: DEFAULT_CACHE_LIFETIME,
        }
    }
}

/// Wrapped data key plus the master key it was wrapped with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMaterial {
    pub key_material_type: String,
    pub is_footer_key: bool,
    #[serde(rename = "masterKeyID")]
    pub master_key_id: String,
    #[serde(rename = "wrappedDEK")]
    pub wrapped_dek: String,
}

impl KeyMaterial {
    fn to_bytes(&self) -> Vec<u8> {
        // Plain struct of strings and a bool, serialization cannot fail.
        serde_json::to_vec(self).unwrap_or_default()
    }

    pub fn parse(key_metadata: &[u8]) -> Result<Self, KmsError> {
        let material: KeyMaterial =
            serde_json::from_slice(key_metadata).map_err(|e| KmsError::InvalidKeyMaterial {
                reason: e.to_string(),
            })?;
        if material.key_material_type != KEY_MATERIAL_TYPE {
            return Err(KmsError::InvalidKeyMaterial {
                reason: format!("unsupported type '{}'", material.key_material_type),
            });
        }
        Ok(material)
    }
}

type KmsClientFactory = dyn Fn(&KmsConnectionConfig) -> Arc<dyn KmsClient> + Send + Sync;

/// Builds Parquet encryption and decryption properties backed by a KMS client.
#[derive(Clone)]
pub struct CryptoFactory {
    kms_client_factory: Arc<KmsClientFactory>,
}

impl CryptoFactory {
    pub fn new<F>(kms_client_factory: F) -> Self
    where
        F: Fn(&KmsConnectionConfig) -> Arc<dyn KmsClient> + Send + Sync + 'static,
    {
        Self {
            kms_client_factory: Arc::new(kms_client_factory),
        }
    }

    /// Factory bound to [`InMemoryKmsClient`].
    pub fn in_memory() -> Self {
        Self::new(|config| Arc::new(InMemoryKmsClient::new(config)) as Arc<dyn KmsClient>)
    }

    /// Fresh encryption properties for one file write.
    pub fn file_encryption_properties(
        &self,
        kms_connection_config: &KmsConnectionConfig,
        encryption_config: &EncryptionConfiguration,
    ) -> LakeResult<FileEncryptionProperties> {
        encryption_config.validate()?;
        let client = (self.kms_client_factory)(kms_connection_config);
        let key_len = encryption_config.data_key_len();

        let footer_dek = random_key(key_len);
        let footer_metadata = wrap(
            client.as_ref(),
            &footer_dek,
            encryption_config.footer_key(),
            true,
        )?;
        let mut builder = FileEncryptionProperties::builder(footer_dek)
            .with_footer_key_metadata(footer_metadata);

        for (key_id, columns) in encryption_config.column_keys() {
            let column_dek = random_key(key_len);
            let metadata = wrap(client.as_ref(), &column_dek, key_id, false)?;
            for column in columns {
                builder =
                    builder.with_column_key_and_metadata(column, column_dek.clone(), metadata.clone());
            }
        }

        debug!(
            footer_key = %encryption_config.footer_key(),
            column_keys = encryption_config.column_keys().len(),
            "Built file encryption properties"
        );
        Ok(builder.build()?)
    }

    /// Key retriever that unwraps key material through the KMS.
    pub fn key_retriever(
        &self,
        kms_connection_config: &KmsConnectionConfig,
        decryption_config: &DecryptionConfiguration,
    ) -> Arc<KmsKeyRetriever> {
        let client = (self.kms_client_factory)(kms_connection_config);
        Arc::new(KmsKeyRetriever::new(client, decryption_config.cache_lifetime))
    }

    pub fn file_decryption_properties(
        &self,
        kms_connection_config: &KmsConnectionConfig,
        decryption_config: &DecryptionConfiguration,
    ) -> LakeResult<FileDecryptionProperties> {
        let retriever = self.key_retriever(kms_connection_config, decryption_config);
        Ok(FileDecryptionProperties::with_key_retriever(retriever).build()?)
    }
}

impl fmt::Debug for CryptoFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CryptoFactory").finish_non_exhaustive()
    }
}

fn random_key(len: usize) -> Vec<u8> {
    let mut key = vec![0u8; len];
    rand::thread_rng().fill(key.as_mut_slice());
    key
}

fn wrap(
    client: &dyn KmsClient,
    data_key: &[u8],
    master_key_id: &KeyId,
    is_footer_key: bool,
) -> Result<Vec<u8>, KmsError> {
    let wrapped_dek = client.wrap_key(data_key, master_key_id.as_str())?;
    Ok(KeyMaterial {
        key_material_type: KEY_MATERIAL_TYPE.to_string(),
        is_footer_key,
        master_key_id: master_key_id.to_string(),
        wrapped_dek,
    }
    .to_bytes())
}

struct CachedKey {
    key: Vec<u8>,
    expires_at: Instant,
}

/// Resolves Parquet key metadata to data keys via a KMS client.
pub struct KmsKeyRetriever {
    client: Arc<dyn KmsClient>,
    cache: DashMap<Vec<u8>, CachedKey>,
    cache_lifetime: Duration,
}

impl KmsKeyRetriever {
    pub fn new(client: Arc<dyn KmsClient>, cache_lifetime: Duration) -> Self {
        Self {
            client,
            cache: DashMap::new(),
            cache_lifetime,
        }
    }

    /// Unwrap the data key described by `key_metadata`.
    pub fn unwrap_key_metadata(&self, key_metadata: &[u8]) -> Result<Vec<u8>, KmsError> {
        let now = Instant::now();
        let cached = self
            .cache
            .get(key_metadata)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.key.clone());
        if let Some(key) = cached {
            return Ok(key);
        }

        let material = KeyMaterial::parse(key_metadata)?;
        let key = self
            .client
            .unwrap_key(&material.wrapped_dek, &material.master_key_id)?;

        if !self.cache_lifetime.is_zero() {
            self.cache.insert(
                key_metadata.to_vec(),
                CachedKey {
                    key: key.clone(),
                    expires_at: now + self.cache_lifetime,
                },
            );
        }
        Ok(key)
    }

    /// Number of data keys currently cached, expired ones included.
    pub fn cached_keys(&self) -> usize {
        self.cache.len()
    }
}

impl KeyRetriever for KmsKeyRetriever {
    fn retrieve_key(&self, key_metadata: &[u8]) -> parquet::errors::Result<Vec<u8>> {
        self.unwrap_key_metadata(key_metadata)
            .map_err(|e| ParquetError::General(e.to_string()))
    }
}
