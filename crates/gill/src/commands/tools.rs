//! Tools command - show which fish binaries gill will use.

use crate::config::GillConfig;
use crate::output::{OutputFormat, OutputFormatter};
use gill_tools::ToolRegistry;
use gill_tools::exec::resolve_executable;
use serde::Serialize;
use std::fmt::Write;
use std::path::Path;

/// Tool info for tools output
#[derive(Debug, Serialize)]
pub struct ToolListItem {
    pub name: String,
    pub category: String,
    pub available: bool,
    pub version: Option<String>,
    /// Configured executable.
    pub executable: String,
    /// Executable resolved through PATH.
    pub resolved: Option<String>,
    pub website: String,
}

#[derive(Debug, Serialize)]
pub struct ToolListResult {
    pub tools: Vec<ToolListItem>,
}

impl OutputFormatter for ToolListResult {
    fn format_text(&self) -> String {
        let mut out = String::new();
        for tool in &self.tools {
            let status = if tool.available { "ok" } else { "missing" };
            let ver = tool.version.as_deref().unwrap_or("not installed");
            writeln!(out, "{} ({}) {} - {}", tool.name, tool.category, status, ver).unwrap();
            writeln!(
                out,
                "  executable: {}",
                tool.resolved.as_deref().unwrap_or(&tool.executable)
            )
            .unwrap();
        }
        out.trim_end().to_string()
    }

    fn format_pretty(&self, colors: bool) -> String {
        use nu_ansi_term::Color::{Green, Red};

        let mut out = String::new();
        for tool in &self.tools {
            let status = match (tool.available, colors) {
                (true, true) => Green.paint("✓").to_string(),
                (false, true) => Red.paint("✗").to_string(),
                (true, false) => "✓".to_string(),
                (false, false) => "✗".to_string(),
            };
            let ver = tool.version.as_deref().unwrap_or("not installed");
            writeln!(out, "  {} {} ({}) - {}", status, tool.name, tool.category, ver).unwrap();
            writeln!(
                out,
                "    Executable: {}",
                tool.resolved.as_deref().unwrap_or(&tool.executable)
            )
            .unwrap();
            writeln!(out, "    Website: {}", tool.website).unwrap();
        }
        out.trim_end().to_string()
    }
}

/// List the configured tools and whether they can be run.
pub fn run(root: Option<&Path>, format: OutputFormat) -> i32 {
    let root = root.unwrap_or_else(|| Path::new("."));
    let config = GillConfig::load(root);
    let registry = ToolRegistry::from_config(&config.tools.to_tools_config());

    let tools: Vec<ToolListItem> = registry
        .tools()
        .iter()
        .map(|t| {
            let info = t.info();
            let resolved = resolve_executable(t.executable());
            let version = resolved.as_ref().and_then(|_| t.version());
            ToolListItem {
                name: info.name.to_string(),
                category: info.category.as_str().to_string(),
                available: resolved.is_some(),
                version,
                executable: t.executable().display().to_string(),
                resolved: resolved.map(|p| p.display().to_string()),
                website: info.website.to_string(),
            }
        })
        .collect();

    let all_available = tools.iter().all(|t| t.available);
    ToolListResult { tools }.print(&format);

    if all_available { 0 } else { 1 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_output() {
        let result = ToolListResult {
            tools: vec![ToolListItem {
                name: "fish".into(),
                category: "linter".into(),
                available: false,
                version: None,
                executable: "fish".into(),
                resolved: None,
                website: "https://fishshell.com".into(),
            }],
        };
        assert_eq!(
            result.format_text(),
            "fish (linter) missing - not installed\n  executable: fish"
        );
        assert!(result.format_pretty(false).contains("✗ fish (linter)"));
    }
}
