//! Diagnostic types shared by the adapters.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity levels for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// Script will not run as written.
    Error,
    /// Should be fixed (e.g. file not formatted).
    Warning,
    Info,
    Hint,
}

impl DiagnosticSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Hint => "hint",
        }
    }

    /// Convert to SARIF level string.
    pub fn to_sarif_level(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info | Self::Hint => "note",
        }
    }
}

/// Source location of a diagnostic.
///
/// Lines are always known. Columns are only present when the tool pointed
/// at a span; `end_column` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: PathBuf,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_column: Option<usize>,
}

impl Location {
    pub fn new(file: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column: None,
            end_column: None,
        }
    }

    pub fn with_span(mut self, column: usize, end_column: usize) -> Self {
        self.column = Some(column);
        self.end_column = Some(end_column);
        self
    }
}

/// A single diagnostic from a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Which tool produced this diagnostic.
    pub tool: String,
    /// Rule ID (`syntax-error`, `formatting`).
    pub rule_id: String,
    pub message: String,
    pub severity: DiagnosticSeverity,
    pub location: Location,
}

impl Diagnostic {
    pub fn error(tool: &str, rule_id: &str, message: &str, location: Location) -> Self {
        Self {
            tool: tool.to_string(),
            rule_id: rule_id.to_string(),
            message: message.to_string(),
            severity: DiagnosticSeverity::Error,
            location,
        }
    }

    pub fn warning(tool: &str, rule_id: &str, message: &str, location: Location) -> Self {
        Self {
            tool: tool.to_string(),
            rule_id: rule_id.to_string(),
            message: message.to_string(),
            severity: DiagnosticSeverity::Warning,
            location,
        }
    }

    pub fn info(tool: &str, rule_id: &str, message: &str, location: Location) -> Self {
        Self {
            severity: DiagnosticSeverity::Info,
            ..Self::warning(tool, rule_id, message, location)
        }
    }
}
