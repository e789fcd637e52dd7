//! Output formatting utilities.
//!
//! Provides consistent JSON/text output across all commands via the `OutputFormatter` trait.

use gill_derive::Merge;
use gill_tools::{Diagnostic, DiagnosticSeverity};
use nu_ansi_term::Color::{Blue, Red, Yellow};
use nu_ansi_term::Style;
use serde::{Deserialize, Serialize};
use std::io::{IsTerminal, Write};

/// Color output mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Auto-detect based on TTY (default)
    #[default]
    Auto,
    Always,
    Never,
}

/// Configuration for pretty output mode.
#[derive(Debug, Clone, Deserialize, Merge, Default, PartialEq)]
#[serde(default)]
pub struct PrettyConfig {
    /// Enable pretty mode. None = auto (true when stdout is TTY)
    pub enabled: Option<bool>,
    /// Color mode: auto (default), always, or never
    pub colors: Option<ColorMode>,
}

impl PrettyConfig {
    /// Should pretty mode be enabled?
    /// Respects explicit setting, otherwise auto-detects TTY.
    pub fn enabled(&self) -> bool {
        self.enabled
            .unwrap_or_else(|| std::io::stdout().is_terminal())
    }

    /// Should colors be used?
    /// Respects colors setting and NO_COLOR env var.
    pub fn use_colors(&self) -> bool {
        if std::env::var("NO_COLOR").is_ok() {
            return false;
        }

        match self.colors.unwrap_or_default() {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => std::io::stdout().is_terminal(),
        }
    }
}

/// Output format and display mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text, no colors.
    #[default]
    Compact,
    /// Pretty text output (human-friendly, with colors if available).
    Pretty { colors: bool },
    Json,
}

impl OutputFormat {
    /// Create from CLI flags and config (fully resolved).
    pub fn from_cli(json: bool, pretty: bool, compact: bool, config: &PrettyConfig) -> Self {
        if json {
            return OutputFormat::Json;
        }

        let is_pretty = if compact {
            false
        } else {
            pretty || config.enabled()
        };

        if is_pretty {
            OutputFormat::Pretty {
                colors: config.use_colors(),
            }
        } else {
            OutputFormat::Compact
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, OutputFormat::Json)
    }

    /// Are colors enabled?
    pub fn use_colors(&self) -> bool {
        matches!(self, OutputFormat::Pretty { colors: true })
    }
}

/// Trait for types that can format output in multiple formats.
///
/// JSON serialization uses serde, while text formatting is custom.
pub trait OutputFormatter: Serialize {
    /// Format as plain text.
    fn format_text(&self) -> String;

    /// Format as pretty text (human-friendly with colors).
    /// Default implementation falls back to format_text().
    fn format_pretty(&self, _colors: bool) -> String {
        self.format_text()
    }

    /// Print to stdout in the specified format.
    fn print(&self, format: &OutputFormat) {
        let text = match format {
            OutputFormat::Compact => self.format_text(),
            OutputFormat::Pretty { colors } => self.format_pretty(*colors),
            OutputFormat::Json => serde_json::to_string(self).unwrap_or_default(),
        };
        if !text.is_empty() {
            print_line(&text);
        }
    }
}

/// Write `text` and a newline to stdout.
///
/// A reader that went away (`gill lint | head`) ends output quietly instead
/// of panicking the way `println!` does.
pub fn print_line(text: &str) {
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = writeln!(stdout, "{text}")
        && e.kind() != std::io::ErrorKind::BrokenPipe
    {
        tracing::warn!("writing output failed: {e}");
    }
}

/// `file:line[:col]: severity [rule] message`, the way compilers print.
pub fn format_diagnostic(diag: &Diagnostic, colors: bool) -> String {
    let severity = diag.severity.as_str();
    let severity = if colors {
        match diag.severity {
            DiagnosticSeverity::Error => Red.bold().paint(severity).to_string(),
            DiagnosticSeverity::Warning => Yellow.paint(severity).to_string(),
            DiagnosticSeverity::Info => Blue.paint(severity).to_string(),
            DiagnosticSeverity::Hint => Style::new().dimmed().paint(severity).to_string(),
        }
    } else {
        severity.to_string()
    };

    let position = match diag.location.column {
        Some(col) => format!("{}:{}", diag.location.line, col),
        None => diag.location.line.to_string(),
    };

    format!(
        "{}:{}: {} [{}] {}",
        diag.location.file.display(),
        position,
        severity,
        diag.rule_id,
        diag.message
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use gill_tools::Location;

    #[derive(Serialize)]
    struct TestOutput {
        name: String,
        count: usize,
    }

    impl OutputFormatter for TestOutput {
        fn format_text(&self) -> String {
            format!("{}: {}", self.name, self.count)
        }
    }

    #[test]
    fn test_output_format_from_cli() {
        let config = PrettyConfig::default();
        assert_eq!(
            OutputFormat::from_cli(false, false, true, &config),
            OutputFormat::Compact
        );
        assert_eq!(
            OutputFormat::from_cli(true, false, false, &config),
            OutputFormat::Json
        );
        let never = PrettyConfig {
            colors: Some(ColorMode::Never),
            ..Default::default()
        };
        assert_eq!(
            OutputFormat::from_cli(false, true, false, &never),
            OutputFormat::Pretty { colors: false }
        );
    }

    #[test]
    fn test_default_text_formatting() {
        let out = TestOutput {
            name: "files".into(),
            count: 2,
        };
        assert_eq!(out.format_text(), "files: 2");
        assert_eq!(out.format_pretty(true), "files: 2");
    }

    #[test]
    fn test_pretty_config_use_colors() {
        let config = PrettyConfig {
            colors: Some(ColorMode::Never),
            ..Default::default()
        };
        assert!(!config.use_colors());
    }

    #[test]
    fn test_format_diagnostic() {
        let d = Diagnostic::error(
            "fish",
            "syntax-error",
            "Missing end to balance this if statement",
            Location::new("config.fish", 3),
        );
        assert_eq!(
            format_diagnostic(&d, false),
            "config.fish:3: error [syntax-error] Missing end to balance this if statement"
        );

        let d = Diagnostic {
            location: Location::new("a.fish", 1).with_span(6, 11),
            ..d
        };
        assert!(format_diagnostic(&d, false).starts_with("a.fish:1:6: error"));
        assert!(format_diagnostic(&d, true).contains("\u{1b}["));
    }
}
