//! Fish adapter - syntax checking via `fish -n`.
//!
//! `fish -n` parses a script without executing it. On a syntax error it exits
//! non-zero and writes `<file> (line <N>): <message>` to stderr, usually
//! followed by the offending source line and a caret line pointing at it:
//!
//! ```text
//! config.fish (line 3): Missing end to balance this if statement
//! if test -n "$x"
//! ^^
//! warning: Error while reading file config.fish
//! ```
//!
//! https://fishshell.com/docs/current/cmds/fish.html

use crate::exec::{Invocation, ProcessOutput};
use crate::{Diagnostic, Location, Tool, ToolCategory, ToolError, ToolInfo, ToolResult};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;
use unicode_width::UnicodeWidthChar;

const TOOL: &str = "fish";
const RULE: &str = "syntax-error";

/// How far below an error line fish prints its caret marker.
const CARET_LOOKAHEAD: usize = 2;

fn error_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.+) \(line (\d+)\): (.+)$").expect("valid regex"))
}

/// Syntax checker backed by `fish -n`.
pub struct FishLint {
    info: ToolInfo,
    executable: PathBuf,
    timeout: Option<Duration>,
}

impl FishLint {
    pub fn new() -> Self {
        Self::with_executable("fish", None)
    }

    pub fn with_executable(executable: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            info: ToolInfo {
                name: TOOL,
                category: ToolCategory::Linter,
                extensions: &["fish"],
                website: "https://fishshell.com/docs/current/cmds/fish.html",
            },
            executable: executable.into(),
            timeout,
        }
    }

    fn check_path(&self, path: &Path, root: &Path) -> Result<ToolResult, ToolError> {
        let output = crate::exec::run(
            &Invocation::new(&self.executable)
                .arg("-n")
                .arg(path)
                .current_dir(root)
                .timeout(self.timeout),
        )?;
        classify(&output, None)
    }
}

impl Default for FishLint {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for FishLint {
    fn info(&self) -> &ToolInfo {
        &self.info
    }

    fn executable(&self) -> &Path {
        &self.executable
    }

    fn run(&self, paths: &[&Path], root: &Path) -> Result<ToolResult, ToolError> {
        let mut diagnostics = Vec::new();
        for path in paths {
            diagnostics.extend(self.check_path(path, root)?.diagnostics);
        }
        Ok(ToolResult::success(TOOL, diagnostics))
    }

    fn check_source(&self, source: &str, file: &Path) -> Result<ToolResult, ToolError> {
        // Without a path argument fish reads the script from stdin and calls
        // it "Standard input", so diagnostics are relabelled to `file`.
        let mut invocation = Invocation::new(&self.executable)
            .arg("-n")
            .stdin(source)
            .timeout(self.timeout);
        if let Some(dir) = file.parent().filter(|d| d.is_dir()) {
            invocation = invocation.current_dir(dir);
        }
        let output = crate::exec::run(&invocation)?;
        classify(&output, Some(file))
    }
}

/// Turn a finished `fish -n` process into a result.
fn classify(output: &ProcessOutput, relabel: Option<&Path>) -> Result<ToolResult, ToolError> {
    if output.success() {
        return Ok(ToolResult::success(TOOL, Vec::new()));
    }
    let stderr = output.stderr_text()?;
    let diagnostics = parse_syntax_errors(stderr, relabel);
    if diagnostics.is_empty() {
        return Err(ToolError::UnexpectedOutput {
            tool: TOOL.to_string(),
            code: output.code,
            stderr: stderr.trim().to_string(),
        });
    }
    Ok(ToolResult::success(TOOL, diagnostics))
}

/// Extract syntax errors from `fish -n` stderr.
///
/// Lines that are not error headers are ignored, except that a caret line
/// shortly after a header narrows that diagnostic to a column span.
pub fn parse_syntax_errors(stderr: &str, relabel: Option<&Path>) -> Vec<Diagnostic> {
    let re = error_line_re();
    let lines: Vec<&str> = stderr.lines().collect();
    let mut diagnostics = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let Some(caps) = re.captures(line) else {
            continue;
        };
        let Ok(line_no) = caps[2].parse::<usize>() else {
            continue;
        };
        let file = match relabel {
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(&caps[1]),
        };
        let mut location = Location::new(file, line_no.max(1));

        for j in (i + 1..lines.len()).take(CARET_LOOKAHEAD) {
            if re.is_match(lines[j]) {
                break;
            }
            if let Some((first, last)) = caret_cells(lines[j]) {
                // The caret sits under the source line fish echoed just above.
                let source = (j > i + 1).then(|| lines[j - 1]).unwrap_or("");
                let column = char_at_cell(source, first) + 1;
                let end_column = char_at_cell(source, last) + 2;
                location = location.with_span(column, end_column);
                break;
            }
        }

        diagnostics.push(Diagnostic::error(TOOL, RULE, caps[3].trim(), location));
    }

    diagnostics
}

/// Parse a caret marker line (`    ^~~~^`) into the 0-based display cells
/// of its first and last marker.
fn caret_cells(line: &str) -> Option<(usize, usize)> {
    let line = line.trim_end();
    if !line.contains('^') {
        return None;
    }
    if !line.chars().all(|c| c.is_whitespace() || c == '^' || c == '~') {
        return None;
    }
    let chars: Vec<char> = line.chars().collect();
    let first = chars.iter().position(|c| !c.is_whitespace())?;
    Some((first, chars.len() - 1))
}

/// 0-based index of the character of `source` covering display cell `cell`.
///
/// fish pads caret lines by display width, so a wide character before the
/// error (an emoji, CJK text) takes two cells but is one character. Cells
/// past the end of `source` count one per character.
fn char_at_cell(source: &str, cell: usize) -> usize {
    let mut cells = 0;
    let mut count = 0;
    for ch in source.chars() {
        let width = ch.width().unwrap_or(1);
        if width > 0 && cell < cells + width {
            return count;
        }
        cells += width;
        count += 1;
    }
    count + cell.saturating_sub(cells)
}
