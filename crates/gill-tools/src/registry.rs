//! Tool registry for looking up the linter and formatter.

use crate::{Diagnostic, Tool, ToolCategory, ToolError, ToolResult, ToolsConfig};
use std::path::Path;
use std::sync::Arc;

/// Registry of available tools.
///
/// Tools are reference-counted so callers can move them into background
/// tasks (the language server runs them off the async runtime).
#[derive(Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::from_config(&ToolsConfig::default())
    }
}

impl ToolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Registry with the built-in adapters using the given executables.
    pub fn from_config(config: &ToolsConfig) -> Self {
        let mut registry = Self::new();
        for tool in crate::adapters::all_adapters(config) {
            registry.register(tool);
        }
        registry
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.push(tool);
    }

    pub fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    /// First registered tool of a category.
    pub fn by_category(&self, category: ToolCategory) -> Option<Arc<dyn Tool>> {
        self.tools
            .iter()
            .find(|t| t.info().category == category)
            .cloned()
    }

    pub fn linter(&self) -> Option<Arc<dyn Tool>> {
        self.by_category(ToolCategory::Linter)
    }

    pub fn formatter(&self) -> Option<Arc<dyn Tool>> {
        self.by_category(ToolCategory::Formatter)
    }

    pub fn by_name(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.info().name == name).cloned()
    }

    /// Run every tool of a category on the given files.
    ///
    /// Each file is run separately so one failing file does not hide
    /// results for the rest.
    pub fn run_category(
        &self,
        category: ToolCategory,
        root: &Path,
        paths: &[&Path],
    ) -> Vec<ToolResult> {
        self.per_file(category, root, paths, |tool, files, root| tool.run(files, root))
    }

    /// Run every fixing tool of a category on the given files, file by file.
    pub fn fix_category(
        &self,
        category: ToolCategory,
        root: &Path,
        paths: &[&Path],
    ) -> Vec<ToolResult> {
        self.per_file(category, root, paths, |tool, files, root| {
            if tool.can_fix() {
                tool.fix(files, root)
            } else {
                Err(ToolError::Unsupported(tool.info().name))
            }
        })
    }

    fn per_file(
        &self,
        category: ToolCategory,
        root: &Path,
        paths: &[&Path],
        op: impl Fn(&dyn Tool, &[&Path], &Path) -> Result<ToolResult, ToolError>,
    ) -> Vec<ToolResult> {
        let mut results = Vec::new();
        for tool in self.tools.iter().filter(|t| t.info().category == category) {
            for path in paths {
                results.push(match op(tool.as_ref(), &[*path], root) {
                    Ok(result) => result,
                    Err(e) => {
                        tracing::warn!(tool = tool.info().name, path = %path.display(), "{e}");
                        ToolResult::failure(tool.info().name, format!("{}: {e}", path.display()))
                    }
                });
            }
        }
        results
    }

    /// Collect all diagnostics from multiple tool results.
    pub fn collect_diagnostics(results: &[ToolResult]) -> Vec<Diagnostic> {
        results.iter().flat_map(|r| r.diagnostics.clone()).collect()
    }
}
