//! Configuration validation errors and storage validation.

use thiserror::Error;
use tracing::warn;

use crate::bucket::{BackendError, Bucket, BucketType};
use crate::config::DebugInfoConfig;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Reasons a loaded configuration is refused.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("debug_info configuration is required")]
    MissingStorage,

    #[error("debug_info.bucket configuration is required")]
    MissingBucket,

    #[error("debug_info.bucket.type is {}", describe_tag(.found))]
    MissingBackendType { found: Option<String> },

    #[error("invalid {backend} bucket settings: {source}")]
    InvalidBackendSettings {
        backend: BucketType,
        #[source]
        source: BackendError,
    },
}

fn describe_tag(found: &Option<String>) -> String {
    match found.as_deref().map(str::trim) {
        None | Some("") => "not set".to_string(),
        Some(tag) => format!("not a supported backend: {:?}", tag),
    }
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::MissingStorage => 70,
            ValidationError::MissingBucket => 71,
            ValidationError::MissingBackendType { .. } => 72,
            ValidationError::InvalidBackendSettings { .. } => 73,
        }
    }

    /// Stable name of the failed check.
    pub fn check_name(&self) -> &'static str {
        match self {
            ValidationError::MissingStorage => "missing_storage",
            ValidationError::MissingBucket => "missing_bucket",
            ValidationError::MissingBackendType { .. } => "missing_backend_type",
            ValidationError::InvalidBackendSettings { .. } => "invalid_backend_settings",
        }
    }
}

/// Validate the debug-info storage section, first failure wins.
pub fn validate_debug_info(debug_info: Option<&DebugInfoConfig>) -> ValidationResult<Bucket> {
    let result = debug_info
        .ok_or(ValidationError::MissingStorage)
        .and_then(|d| d.bucket.as_ref().ok_or(ValidationError::MissingBucket))
        .and_then(|b| b.resolve());

    if let Err(e) = &result {
        warn!(check = e.check_name(), code = e.code(), error = %e, "storage validation failed");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::BucketConfig;

    #[test]
    fn test_nil_debug_info() {
        let err = validate_debug_info(None).unwrap_err();
        assert!(matches!(err, ValidationError::MissingStorage));
        assert_eq!(err.code(), 70);
    }

    #[test]
    fn test_nil_bucket() {
        let d = DebugInfoConfig { bucket: None };
        let err = validate_debug_info(Some(&d)).unwrap_err();
        assert!(matches!(err, ValidationError::MissingBucket));
        assert_eq!(err.check_name(), "missing_bucket");
    }

    #[test]
    fn test_error_messages_name_the_check() {
        let unset = ValidationError::MissingBackendType { found: None };
        assert_eq!(unset.to_string(), "debug_info.bucket.type is not set");

        let unknown = ValidationError::MissingBackendType {
            found: Some("SWIFT".into()),
        };
        assert!(unknown.to_string().contains("\"SWIFT\""));

        let invalid = ValidationError::InvalidBackendSettings {
            backend: BucketType::Filesystem,
            source: BackendError::MissingField { field: "directory" },
        };
        assert_eq!(
            invalid.to_string(),
            "invalid FILESYSTEM bucket settings: missing required setting: directory"
        );
    }

    #[test]
    fn test_valid_storage_returns_bucket() {
        let d = DebugInfoConfig {
            bucket: Some(BucketConfig::new(
                BucketType::Gcs,
                serde_yaml::from_str("bucket: parca-debuginfo").unwrap(),
            )),
        };
        let bucket = validate_debug_info(Some(&d)).unwrap();
        assert_eq!(bucket.kind(), BucketType::Gcs);
    }

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            ValidationError::MissingStorage,
            ValidationError::MissingBucket,
            ValidationError::MissingBackendType { found: None },
            ValidationError::InvalidBackendSettings {
                backend: BucketType::S3,
                source: BackendError::MissingField { field: "bucket" },
            },
        ];
        let mut codes: Vec<u32> = errors.iter().map(|e| e.code()).collect();
        codes.dedup();
        assert_eq!(codes.len(), 4);
    }
}
