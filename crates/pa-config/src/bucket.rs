//! Debug-info storage descriptors.
//!
//! A [`BucketConfig`] is what the document says: a type tag plus an opaque
//! settings block. Resolving it yields a [`Bucket`], a tagged union whose
//! variants each own exactly the settings their backend needs.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validate::{ValidationError, ValidationResult};

/// Storage backend type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BucketType {
    Filesystem,
    S3,
    Gcs,
    Azure,
}

impl BucketType {
    pub const ALL: [BucketType; 4] = [
        BucketType::Filesystem,
        BucketType::S3,
        BucketType::Gcs,
        BucketType::Azure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BucketType::Filesystem => "FILESYSTEM",
            BucketType::S3 => "S3",
            BucketType::Gcs => "GCS",
            BucketType::Azure => "AZURE",
        }
    }
}

impl fmt::Display for BucketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BucketType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BucketType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown bucket type: {}", s))
    }
}

/// Errors raised by a backend while checking its own settings.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("cannot decode settings: {0}")]
    Decode(#[from] serde_yaml::Error),

    #[error("missing required setting: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: &'static str, message: String },
}

/// Storage descriptor as written in the document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BucketConfig {
    /// Backend type tag. Kept as text so an unknown tag is reported by
    /// validation rather than by the decoder.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Backend-specific settings, interpreted only by that backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_yaml::Value>,

    /// Object key prefix inside the bucket.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub prefix: String,
}

impl BucketConfig {
    pub fn new(kind: BucketType, config: serde_yaml::Value) -> Self {
        BucketConfig {
            kind: Some(kind.to_string()),
            config: Some(config),
            prefix: String::new(),
        }
    }

    /// Resolve the type tag and hand the settings block to that backend.
    pub fn resolve(&self) -> ValidationResult<Bucket> {
        let kind = self
            .kind
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .and_then(|k| k.parse::<BucketType>().ok())
            .ok_or_else(|| ValidationError::MissingBackendType {
                found: self.kind.clone(),
            })?;

        Bucket::from_settings(kind, self.config.as_ref()).map_err(|source| {
            ValidationError::InvalidBackendSettings {
                backend: kind,
                source,
            }
        })
    }
}

/// A storage backend with its settings, ready for a client to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bucket {
    Filesystem(FilesystemSettings),
    S3(S3Settings),
    Gcs(GcsSettings),
    Azure(AzureSettings),
}

impl Bucket {
    fn from_settings(
        kind: BucketType,
        settings: Option<&serde_yaml::Value>,
    ) -> Result<Bucket, BackendError> {
        let bucket = match kind {
            BucketType::Filesystem => Bucket::Filesystem(decode_settings(settings)?),
            BucketType::S3 => Bucket::S3(decode_settings(settings)?),
            BucketType::Gcs => Bucket::Gcs(decode_settings(settings)?),
            BucketType::Azure => Bucket::Azure(decode_settings(settings)?),
        };
        bucket.check()?;
        Ok(bucket)
    }

    pub fn kind(&self) -> BucketType {
        match self {
            Bucket::Filesystem(_) => BucketType::Filesystem,
            Bucket::S3(_) => BucketType::S3,
            Bucket::Gcs(_) => BucketType::Gcs,
            Bucket::Azure(_) => BucketType::Azure,
        }
    }

    fn check(&self) -> Result<(), BackendError> {
        match self {
            Bucket::Filesystem(s) => s.validate(),
            Bucket::S3(s) => s.validate(),
            Bucket::Gcs(s) => s.validate(),
            Bucket::Azure(s) => s.validate(),
        }
    }
}

/// An absent or null block decodes as empty settings.
fn decode_settings<T: DeserializeOwned>(
    settings: Option<&serde_yaml::Value>,
) -> Result<T, BackendError> {
    let value = match settings {
        None | Some(serde_yaml::Value::Null) => {
            serde_yaml::Value::Mapping(serde_yaml::Mapping::new())
        }
        Some(v) => v.clone(),
    };
    Ok(serde_yaml::from_value(value)?)
}

fn require(field: &'static str, value: &str) -> Result<(), BackendError> {
    if value.trim().is_empty() {
        return Err(BackendError::MissingField { field });
    }
    Ok(())
}

/// Local directory storage.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilesystemSettings {
    #[serde(default)]
    pub directory: String,
}

impl FilesystemSettings {
    pub fn validate(&self) -> Result<(), BackendError> {
        require("directory", &self.directory)
    }
}

/// S3-compatible object storage.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct S3Settings {
    #[serde(default)]
    pub bucket: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub access_key: String,
    #[serde(default)]
    pub secret_key: String,
    #[serde(default)]
    pub insecure: bool,
}

impl S3Settings {
    pub fn validate(&self) -> Result<(), BackendError> {
        require("bucket", &self.bucket)?;
        require("endpoint", &self.endpoint)?;
        match (self.access_key.is_empty(), self.secret_key.is_empty()) {
            (false, true) => Err(BackendError::InvalidValue {
                field: "secret_key",
                message: "must be set when access_key is set".to_string(),
            }),
            (true, false) => Err(BackendError::InvalidValue {
                field: "access_key",
                message: "must be set when secret_key is set".to_string(),
            }),
            _ => Ok(()),
        }
    }
}

/// Google Cloud Storage.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GcsSettings {
    #[serde(default)]
    pub bucket: String,
    /// Inline service account JSON; ambient credentials are used when empty.
    #[serde(default)]
    pub service_account: String,
}

impl GcsSettings {
    pub fn validate(&self) -> Result<(), BackendError> {
        require("bucket", &self.bucket)
    }
}

/// Azure Blob Storage.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AzureSettings {
    #[serde(default)]
    pub storage_account: String,
    #[serde(default)]
    pub storage_account_key: String,
    #[serde(default)]
    pub container: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub msi_resource: String,
}

impl AzureSettings {
    pub fn validate(&self) -> Result<(), BackendError> {
        require("storage_account", &self.storage_account)?;
        require("container", &self.container)?;
        if self.msi_resource.is_empty() {
            require("storage_account_key", &self.storage_account_key)?;
        }
        Ok(())
    }
}
