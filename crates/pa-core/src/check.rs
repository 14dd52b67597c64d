//! The `check` report: what was loaded, from where, and whether it is usable.

use chrono::{DateTime, Utc};
use pa_config::{ConfigError, ConfigPath, ConfigSnapshot, LoadedConfig};
use serde::Serialize;

use crate::exit_codes::ExitCode;
use crate::output::ReportFormat;

/// Outcome of one configuration check run.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    /// "ok" or "error".
    pub status: &'static str,
    pub exit_code: i32,
    pub code_name: &'static str,
    /// How the config path was found.
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<ConfigSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CheckFailure>,
}

/// Why a check failed.
#[derive(Debug, Clone, Serialize)]
pub struct CheckFailure {
    pub code: u32,
    pub check: &'static str,
    pub message: String,
}

impl CheckFailure {
    fn from_error(err: &ConfigError) -> Self {
        let check = match err {
            ConfigError::NotFound => "resolve",
            ConfigError::Io { .. } => "read",
            ConfigError::Decode(_) => "decode",
            ConfigError::Validation(v) => v.check_name(),
        };
        CheckFailure {
            code: err.code(),
            check,
            message: err.to_string(),
        }
    }
}

impl CheckReport {
    pub fn new(
        run_id: impl Into<String>,
        resolved: &ConfigPath,
        outcome: &Result<LoadedConfig, ConfigError>,
    ) -> Self {
        let exit = match outcome {
            Ok(_) => ExitCode::Clean,
            Err(e) => ExitCode::for_config_error(e),
        };
        let (path, snapshot, error) = match outcome {
            Ok(loaded) => (
                loaded.snapshot.path.clone(),
                Some(loaded.snapshot.clone()),
                None,
            ),
            Err(e) => {
                let path = match e {
                    ConfigError::Io { path, .. } => Some(path.display().to_string()),
                    _ => resolved.path.as_ref().map(|p| p.display().to_string()),
                };
                (path, None, Some(CheckFailure::from_error(e)))
            }
        };

        CheckReport {
            run_id: run_id.into(),
            generated_at: Utc::now(),
            status: if exit.is_success() { "ok" } else { "error" },
            exit_code: exit.as_i32(),
            code_name: exit.code_name(),
            source: resolved.source.to_string(),
            path,
            snapshot,
            error,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Render the report for stdout.
    pub fn render(&self, format: ReportFormat) -> Result<String, serde_json::Error> {
        match format {
            ReportFormat::Json => serde_json::to_string_pretty(self),
            ReportFormat::Summary => Ok(self.render_summary()),
            ReportFormat::Md => Ok(self.render_markdown()),
        }
    }

    fn render_summary(&self) -> String {
        match (&self.snapshot, &self.error) {
            (Some(snapshot), _) => format!(
                "[{}] check: OK ({} jobs, {} endpoints, storage {}, config {})",
                self.run_id,
                snapshot.summary.jobs.len(),
                snapshot.summary.enabled_endpoints,
                snapshot.summary.storage_backend.as_deref().unwrap_or("-"),
                snapshot.short_id(),
            ),
            (None, Some(failure)) => format!(
                "[{}] check: FAILED {} ({})",
                self.run_id, failure.check, self.code_name
            ),
            (None, None) => format!("[{}] check: {}", self.run_id, self.status),
        }
    }

    fn render_markdown(&self) -> String {
        let mut out = String::from("# pa-core check\n\n");
        let location = self.path.as_deref().unwrap_or("(none)");
        out.push_str(&format!("Config: `{}` ({})\n\n", location, self.source));

        if let Some(snapshot) = &self.snapshot {
            let summary = &snapshot.summary;
            out.push_str("✓ configuration valid\n");
            out.push_str(&format!("  Jobs: {}\n", summary.jobs.join(", ")));
            out.push_str(&format!(
                "  Endpoints: {} ({} enabled)\n",
                summary.endpoints, summary.enabled_endpoints
            ));
            out.push_str(&format!(
                "  Storage: {}\n",
                summary.storage_backend.as_deref().unwrap_or("-")
            ));
            out.push_str(&format!("  Digest: {}\n", snapshot.short_id()));
        }
        if let Some(failure) = &self.error {
            out.push_str(&format!("✗ {}: {}\n", failure.check, self.code_name));
            out.push_str(&format!("  Error: {}\n", failure.message));
        }

        out.push_str(&format!("\nRun: {}", self.run_id));
        out
    }
}
