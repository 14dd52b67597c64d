//! Exit codes for the pa-core CLI.
//!
//! Exit codes communicate the outcome without requiring output parsing.
//!
//! Exit code ranges:
//! - 0: Success
//! - 10-19: User/environment errors (recoverable by user action)
//! - 20-29: Internal errors (bugs, should be reported)

use pa_config::ConfigError;

/// Exit codes for pa-core operations.
///
/// These codes are a stable contract for automation. Changes require
/// a major version bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Configuration loaded and validated.
    Clean = 0,

    // ========================================================================
    // User / Environment Errors (10-19)
    // ========================================================================
    /// Invalid arguments
    ArgsError = 10,

    /// Configuration could not be decoded or failed validation
    ConfigInvalid = 11,

    /// No configuration file at the resolved location
    ConfigNotFound = 12,

    // ========================================================================
    // Internal Errors (20-29)
    // ========================================================================
    /// Internal error (bug - please report)
    InternalError = 20,

    /// I/O error
    IoError = 21,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        self == ExitCode::Clean
    }

    /// Check if this exit code is a user/environment error (codes 10-19).
    /// These can be resolved by user action.
    pub fn is_user_error(self) -> bool {
        let code = self as i32;
        (10..20).contains(&code)
    }

    /// Check if this exit code is an internal error (codes 20-29).
    /// These indicate bugs and should be reported.
    pub fn is_internal_error(self) -> bool {
        let code = self as i32;
        code >= 20
    }

    /// Get the error code name as a string constant (for JSON output).
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::ConfigInvalid => "ERR_CONFIG_INVALID",
            ExitCode::ConfigNotFound => "ERR_CONFIG_NOT_FOUND",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }

    /// Map a configuration load failure to its exit code.
    pub fn for_config_error(err: &ConfigError) -> ExitCode {
        match err {
            ConfigError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                ExitCode::ConfigNotFound
            }
            ConfigError::NotFound => ExitCode::ConfigNotFound,
            ConfigError::Io { .. } => ExitCode::IoError,
            ConfigError::Decode(_) | ConfigError::Validation(_) => ExitCode::ConfigInvalid,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pa_config::ValidationError;
    use std::path::PathBuf;

    #[test]
    fn test_ranges() {
        assert!(ExitCode::Clean.is_success());
        assert!(ExitCode::ConfigInvalid.is_user_error());
        assert!(ExitCode::ConfigNotFound.is_user_error());
        assert!(!ExitCode::ConfigInvalid.is_internal_error());
        assert!(ExitCode::IoError.is_internal_error());
        assert!(ExitCode::InternalError.is_internal_error());
    }

    #[test]
    fn test_display() {
        assert_eq!(ExitCode::ConfigInvalid.to_string(), "ERR_CONFIG_INVALID (11)");
        assert_eq!(i32::from(ExitCode::IoError), 21);
    }

    #[test]
    fn test_for_config_error() {
        let not_found = ConfigError::Io {
            path: PathBuf::from("/missing"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(ExitCode::for_config_error(&not_found), ExitCode::ConfigNotFound);

        let denied = ConfigError::Io {
            path: PathBuf::from("/root/agent.yaml"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(ExitCode::for_config_error(&denied), ExitCode::IoError);

        assert_eq!(
            ExitCode::for_config_error(&ConfigError::NotFound),
            ExitCode::ConfigNotFound
        );

        let invalid = ConfigError::Validation(ValidationError::MissingBucket);
        assert_eq!(ExitCode::for_config_error(&invalid), ExitCode::ConfigInvalid);
    }
}
