//! Tool trait and common types.

use crate::Diagnostic;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Category of tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolCategory {
    /// Finds syntax errors (`fish -n`).
    Linter,
    /// Rewrites code style (`fish_indent`).
    Formatter,
}

impl ToolCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linter => "linter",
            Self::Formatter => "formatter",
        }
    }
}

/// Information about a tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Tool name (`fish`, `fish_indent`).
    pub name: &'static str,
    pub category: ToolCategory,
    /// File extensions this tool handles.
    pub extensions: &'static [&'static str],
    pub website: &'static str,
}

/// Result of running a tool.
#[derive(Debug, Clone)]
pub struct ToolResult {
    /// Tool that produced this result.
    pub tool: String,
    pub diagnostics: Vec<Diagnostic>,
    /// Whether the tool ran successfully.
    pub success: bool,
    /// Error message if the tool failed.
    pub error: Option<String>,
}

impl ToolResult {
    pub fn success(tool: &str, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            tool: tool.to_string(),
            diagnostics,
            success: true,
            error: None,
        }
    }

    pub fn failure(tool: &str, error: impl ToString) -> Self {
        Self {
            tool: tool.to_string(),
            diagnostics: Vec::new(),
            success: false,
            error: Some(error.to_string()),
        }
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == crate::DiagnosticSeverity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == crate::DiagnosticSeverity::Warning)
            .count()
    }
}

/// Error type for tool operations.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("tool not found: {0}")]
    NotFound(String),
    #[error("{program} timed out after {after:?}")]
    Timeout { program: String, after: Duration },
    #[error("{tool} exited with {}: {stderr}", exit_code_str(*.code))]
    ExecutionFailed {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("unexpected output from {tool} (exit {}): {stderr}", exit_code_str(*.code))]
    UnexpectedOutput {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("tool produced non-UTF-8 {0}")]
    NonUtf8(&'static str),
    #[error("{0} does not support this operation")]
    Unsupported(&'static str),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_code_str(code: Option<i32>) -> String {
    match code {
        Some(c) => format!("code {c}"),
        None => "signal".to_string(),
    }
}

/// Trait for tool adapters.
///
/// File-based operations (`run`, `fix`) mirror how the tools are used on the
/// command line. Source-based operations feed an in-memory buffer on stdin,
/// which is what an editor with unsaved changes needs.
pub trait Tool: Send + Sync {
    /// Get tool information.
    fn info(&self) -> &ToolInfo;

    /// Configured executable (name or path).
    fn executable(&self) -> &Path;

    /// Check if the tool is available on the system.
    fn is_available(&self) -> bool {
        crate::exec::resolve_executable(self.executable()).is_some()
    }

    /// Get the tool version, if available.
    fn version(&self) -> Option<String> {
        let out = crate::exec::run(
            &crate::Invocation::new(self.executable())
                .arg("--version")
                .timeout(Some(Duration::from_secs(5))),
        )
        .ok()
        .filter(|o| o.success())?;
        out.stdout_text()
            .ok()
            .map(|s| s.lines().next().unwrap_or("").trim().to_string())
    }

    /// Run the tool on the given files.
    fn run(&self, paths: &[&Path], root: &Path) -> Result<ToolResult, ToolError>;

    /// Whether this tool can fix issues automatically.
    fn can_fix(&self) -> bool {
        false
    }

    /// Run the tool in fix mode (if supported).
    fn fix(&self, paths: &[&Path], root: &Path) -> Result<ToolResult, ToolError> {
        self.run(paths, root)
    }

    /// Check an in-memory buffer, reporting diagnostics against `file`.
    fn check_source(&self, _source: &str, _file: &Path) -> Result<ToolResult, ToolError> {
        Err(ToolError::Unsupported(self.info().name))
    }

    /// Format an in-memory buffer.
    fn format_source(&self, _source: &str) -> Result<String, ToolError> {
        Err(ToolError::Unsupported(self.info().name))
    }
}

/// Expand files and directories into the fish scripts they contain.
///
/// Explicit files are kept as given regardless of extension. Directories are
/// walked recursively, skipping hidden entries.
pub fn find_fish_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        let walker = walkdir::WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));
        for entry in walker.flatten() {
            if entry.file_type().is_file()
                && entry.path().extension().is_some_and(|ext| ext == "fish")
            {
                files.push(entry.into_path());
            }
        }
    }
    files
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}
