//! Lint command - syntax-check fish scripts with `fish -n`.

use crate::config::GillConfig;
use crate::output::{OutputFormat, OutputFormatter, format_diagnostic, print_line};
use clap::Args;
use gill_tools::{Diagnostic, SarifReport, ToolCategory, ToolRegistry, find_fish_files};
use serde::Serialize;
use std::fmt::Write;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct LintArgs {
    /// Files or directories to lint (default: current directory)
    pub paths: Vec<PathBuf>,

    /// Output SARIF 2.1.0 instead of text/JSON
    #[arg(long)]
    pub sarif: bool,
}

/// Result of a lint run
#[derive(Debug, Serialize)]
pub struct LintReport {
    pub files_checked: usize,
    pub diagnostics: Vec<Diagnostic>,
    /// Files the linter could not check, with the reason.
    pub failures: Vec<String>,
}

impl LintReport {
    fn render(&self, colors: bool) -> String {
        let mut out = String::new();
        for diag in &self.diagnostics {
            writeln!(out, "{}", format_diagnostic(diag, colors)).unwrap();
        }
        for failure in &self.failures {
            writeln!(out, "failed: {failure}").unwrap();
        }
        out.trim_end().to_string()
    }

    pub fn has_errors(&self) -> bool {
        !self.failures.is_empty()
            || self
                .diagnostics
                .iter()
                .any(|d| d.severity == gill_tools::DiagnosticSeverity::Error)
    }
}

impl OutputFormatter for LintReport {
    fn format_text(&self) -> String {
        self.render(false)
    }

    fn format_pretty(&self, colors: bool) -> String {
        self.render(colors)
    }
}

/// Lint files and report diagnostics.
pub fn run(args: LintArgs, root: Option<&Path>, format: OutputFormat) -> i32 {
    let root = root.unwrap_or_else(|| Path::new("."));
    let config = GillConfig::load(root);
    let registry = ToolRegistry::from_config(&config.tools.to_tools_config());

    let Some(linter) = registry.linter() else {
        eprintln!("No linter configured.");
        return 1;
    };
    if !linter.is_available() {
        eprintln!(
            "{} not found (looked for {})",
            linter.info().name,
            linter.executable().display()
        );
        return 1;
    }

    let targets = if args.paths.is_empty() {
        vec![root.to_path_buf()]
    } else {
        args.paths
    };
    let files = find_fish_files(&targets);
    if files.is_empty() && !format.is_json() && !args.sarif {
        eprintln!("No fish files found.");
    }

    let paths: Vec<&Path> = files.iter().map(PathBuf::as_path).collect();
    let results = registry.run_category(ToolCategory::Linter, Path::new("."), &paths);

    let report = LintReport {
        files_checked: files.len(),
        diagnostics: ToolRegistry::collect_diagnostics(&results),
        failures: results.iter().filter_map(|r| r.error.clone()).collect(),
    };

    if args.sarif {
        print_line(&SarifReport::from_diagnostics(&report.diagnostics).to_json());
    } else {
        report.print(&format);
        if !format.is_json() {
            let errors: usize = results.iter().map(|r| r.error_count()).sum();
            if errors > 0 {
                eprintln!();
                eprintln!(
                    "Found {} error(s) in {} file(s) checked",
                    errors, report.files_checked
                );
            }
        }
    }

    if report.has_errors() { 1 } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gill_tools::Location;

    #[test]
    fn test_report_text_and_exit_status() {
        let clean = LintReport {
            files_checked: 2,
            diagnostics: Vec::new(),
            failures: Vec::new(),
        };
        assert!(!clean.has_errors());
        assert_eq!(clean.format_text(), "");

        let broken = LintReport {
            files_checked: 1,
            diagnostics: vec![Diagnostic::error(
                "fish",
                "syntax-error",
                "Missing end",
                Location::new("a.fish", 2),
            )],
            failures: vec!["b.fish: fish timed out after 10s".to_string()],
        };
        assert!(broken.has_errors());
        assert_eq!(
            broken.format_text(),
            "a.fish:2: error [syntax-error] Missing end\nfailed: b.fish: fish timed out after 10s"
        );
    }

    #[test]
    fn test_report_json() {
        let report = LintReport {
            files_checked: 1,
            diagnostics: vec![Diagnostic::error(
                "fish",
                "syntax-error",
                "bad",
                Location::new("a.fish", 1),
            )],
            failures: Vec::new(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["files_checked"], 1);
        assert_eq!(json["diagnostics"][0]["location"]["line"], 1);
        assert_eq!(json["diagnostics"][0]["severity"], "error");
    }
}
