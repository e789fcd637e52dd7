//! fish_indent adapter - the fish formatter.
//!
//! `fish_indent` reads a script on stdin and writes the reformatted script to
//! stdout, exiting 0 on success.
//! https://fishshell.com/docs/current/cmds/fish_indent.html

use crate::exec::Invocation;
use crate::{Diagnostic, Location, Tool, ToolCategory, ToolError, ToolInfo, ToolResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

const TOOL: &str = "fish_indent";

/// Formatter backed by `fish_indent`.
pub struct FishIndent {
    info: ToolInfo,
    executable: PathBuf,
    timeout: Option<Duration>,
}

impl FishIndent {
    pub fn new() -> Self {
        Self::with_executable("fish_indent", None)
    }

    pub fn with_executable(executable: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            info: ToolInfo {
                name: TOOL,
                category: ToolCategory::Formatter,
                extensions: &["fish"],
                website: "https://fishshell.com/docs/current/cmds/fish_indent.html",
            },
            executable: executable.into(),
            timeout,
        }
    }

    fn read(path: &Path, root: &Path) -> Result<String, ToolError> {
        Ok(std::fs::read_to_string(root.join(path))?)
    }
}

impl Default for FishIndent {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for FishIndent {
    fn info(&self) -> &ToolInfo {
        &self.info
    }

    fn executable(&self) -> &Path {
        &self.executable
    }

    /// Check mode: report files whose formatted form differs.
    fn run(&self, paths: &[&Path], root: &Path) -> Result<ToolResult, ToolError> {
        let mut diagnostics = Vec::new();
        for path in paths {
            let original = Self::read(path, root)?;
            let formatted = self.format_source(&original)?;
            if formatted != original {
                let line = first_differing_line(&original, &formatted);
                diagnostics.push(Diagnostic::warning(
                    TOOL,
                    "formatting",
                    "File is not formatted",
                    Location::new(*path, line),
                ));
            }
        }
        Ok(ToolResult::success(TOOL, diagnostics))
    }

    fn can_fix(&self) -> bool {
        true
    }

    /// Rewrite files whose formatted form differs, reporting each one.
    fn fix(&self, paths: &[&Path], root: &Path) -> Result<ToolResult, ToolError> {
        let mut rewritten = Vec::new();
        for path in paths {
            let original = Self::read(path, root)?;
            let formatted = self.format_source(&original)?;
            if formatted != original {
                tracing::info!(path = %path.display(), "rewriting");
                let line = first_differing_line(&original, &formatted);
                std::fs::write(root.join(path), formatted)?;
                rewritten.push(Diagnostic::info(
                    TOOL,
                    "formatting",
                    "Reformatted file",
                    Location::new(*path, line),
                ));
            }
        }
        Ok(ToolResult::success(TOOL, rewritten))
    }

    fn format_source(&self, source: &str) -> Result<String, ToolError> {
        let output = crate::exec::run(
            &Invocation::new(&self.executable)
                .stdin(source)
                .timeout(self.timeout),
        )?;
        if !output.success() {
            return Err(ToolError::ExecutionFailed {
                tool: TOOL.to_string(),
                code: output.code,
                stderr: output.stderr_lossy(),
            });
        }
        Ok(output.stdout_text()?.to_string())
    }
}

/// 1-based line of the first difference between two texts.
pub fn first_differing_line(a: &str, b: &str) -> usize {
    let mut left = a.lines();
    let mut right = b.lines();
    let mut line = 1;
    loop {
        match (left.next(), right.next()) {
            (Some(x), Some(y)) if x == y => line += 1,
            (None, None) => return 1,
            _ => return line,
        }
    }
}
