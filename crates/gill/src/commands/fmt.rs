//! Format command - rewrite fish scripts with `fish_indent`.

use crate::config::GillConfig;
use crate::output::{OutputFormat, OutputFormatter, format_diagnostic};
use clap::Args;
use gill_tools::{Diagnostic, Tool, ToolCategory, ToolError, ToolRegistry, find_fish_files};
use serde::Serialize;
use std::fmt::Write as _;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct FmtArgs {
    /// Files or directories to format (default: current directory; `-` for stdin)
    pub paths: Vec<PathBuf>,

    /// Report unformatted files instead of rewriting them
    #[arg(long)]
    pub check: bool,
}

/// Result of a format run
#[derive(Debug, Default, Serialize)]
pub struct FmtReport {
    pub check: bool,
    pub files_checked: usize,
    /// One `formatting` diagnostic per file rewritten, or with `--check`,
    /// per file that would be, at its first differing line.
    pub diagnostics: Vec<Diagnostic>,
    pub failures: Vec<String>,
}

impl FmtReport {
    fn render(&self, colors: bool) -> String {
        let mut out = String::new();
        for diag in &self.diagnostics {
            if self.check {
                writeln!(out, "{}", format_diagnostic(diag, colors)).unwrap();
            } else {
                writeln!(out, "formatted: {}", diag.location.file.display()).unwrap();
            }
        }
        for failure in &self.failures {
            writeln!(out, "failed: {failure}").unwrap();
        }
        out.trim_end().to_string()
    }

    pub fn has_errors(&self) -> bool {
        !self.failures.is_empty() || (self.check && !self.diagnostics.is_empty())
    }
}

impl OutputFormatter for FmtReport {
    fn format_text(&self) -> String {
        self.render(false)
    }

    fn format_pretty(&self, colors: bool) -> String {
        self.render(colors)
    }
}

/// Check or rewrite `files` with the registry's formatter.
fn format_files(registry: &ToolRegistry, files: &[PathBuf], check: bool) -> FmtReport {
    let paths: Vec<&Path> = files.iter().map(PathBuf::as_path).collect();
    let root = Path::new(".");
    let results = if check {
        registry.run_category(ToolCategory::Formatter, root, &paths)
    } else {
        registry.fix_category(ToolCategory::Formatter, root, &paths)
    };

    FmtReport {
        check,
        files_checked: files.len(),
        diagnostics: ToolRegistry::collect_diagnostics(&results),
        failures: results.into_iter().filter_map(|r| r.error).collect(),
    }
}

fn format_stdin(formatter: &dyn Tool) -> Result<(), ToolError> {
    let mut source = String::new();
    std::io::stdin().read_to_string(&mut source)?;
    let formatted = formatter.format_source(&source)?;
    if let Err(e) = std::io::stdout().lock().write_all(formatted.as_bytes())
        && e.kind() != std::io::ErrorKind::BrokenPipe
    {
        return Err(e.into());
    }
    Ok(())
}

/// Format files, or check that they are formatted.
pub fn run(args: FmtArgs, root: Option<&Path>, format: OutputFormat) -> i32 {
    let root = root.unwrap_or_else(|| Path::new("."));
    let config = GillConfig::load(root);
    let registry = ToolRegistry::from_config(&config.tools.to_tools_config());

    let Some(formatter) = registry.formatter() else {
        eprintln!("No formatter configured.");
        return 1;
    };
    if !formatter.is_available() {
        eprintln!(
            "{} not found (looked for {})",
            formatter.info().name,
            formatter.executable().display()
        );
        return 1;
    }

    if args.paths.len() == 1 && args.paths[0] == Path::new("-") {
        return match format_stdin(formatter.as_ref()) {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("{e}");
                1
            }
        };
    }

    let targets = if args.paths.is_empty() {
        vec![root.to_path_buf()]
    } else {
        args.paths
    };
    let files = find_fish_files(&targets);
    if files.is_empty() && !format.is_json() {
        eprintln!("No fish files found.");
    }

    let report = format_files(&registry, &files, args.check);
    report.print(&format);

    if report.has_errors() { 1 } else { 0 }
}
