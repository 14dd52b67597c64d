//! Output format specifications.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Formats for the `check` report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Structured JSON (default for machine consumption)
    #[default]
    Json,

    /// One-line summary for quick status checks
    Summary,

    /// Human-readable Markdown
    Md,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Json => write!(f, "json"),
            ReportFormat::Summary => write!(f, "summary"),
            ReportFormat::Md => write!(f, "md"),
        }
    }
}

/// Formats for printing configuration documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    #[default]
    Yaml,
    Json,
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentFormat::Yaml => write!(f, "yaml"),
            DocumentFormat::Json => write!(f, "json"),
        }
    }
}

/// Failure to encode a payload for stdout.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot encode YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Encode `value` as a document in the requested format.
pub fn render_document<T: Serialize + ?Sized>(
    value: &T,
    format: DocumentFormat,
) -> Result<String, RenderError> {
    match format {
        DocumentFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        DocumentFormat::Json => {
            let mut out = serde_json::to_string_pretty(value)?;
            out.push('\n');
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_format_display() {
        assert_eq!(ReportFormat::Md.to_string(), "md");
        assert_eq!(DocumentFormat::Yaml.to_string(), "yaml");
    }

    #[test]
    fn test_render_document() {
        let mut value = BTreeMap::new();
        value.insert("path", "/debug/pprof/heap");

        let yaml = render_document(&value, DocumentFormat::Yaml).unwrap();
        assert_eq!(yaml, "path: /debug/pprof/heap\n");

        let json = render_document(&value, DocumentFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["path"], "/debug/pprof/heap");
    }
}
