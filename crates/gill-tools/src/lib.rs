//! Adapters for the external fish toolchain.
//!
//! All linting and formatting is delegated to two binaries:
//!
//! - **`fish -n`** parses a script without running it and reports syntax
//!   errors on stderr.
//! - **`fish_indent`** reformats a script read from stdin.
//!
//! This crate spawns them ([`exec`]), turns their output into
//! [`Diagnostic`]s, and exposes both behind the [`Tool`] trait.
//!
//! # Example
//!
//! ```ignore
//! use gill_tools::{ToolRegistry, ToolsConfig};
//! use std::path::Path;
//!
//! let registry = ToolRegistry::from_config(&ToolsConfig::default());
//! let linter = registry.linter().unwrap();
//! let result = linter.check_source("if true\n", Path::new("config.fish"))?;
//! for d in &result.diagnostics {
//!     println!("{}:{}: {}", d.location.file.display(), d.location.line, d.message);
//! }
//! ```

pub mod adapters;
mod diagnostic;
pub mod exec;
mod registry;
mod sarif;
mod tools;

pub use diagnostic::{Diagnostic, DiagnosticSeverity, Location};
pub use exec::{Invocation, ProcessOutput};
pub use registry::ToolRegistry;
pub use sarif::SarifReport;
pub use tools::{Tool, ToolCategory, ToolError, ToolInfo, ToolResult, find_fish_files};

use std::path::PathBuf;
use std::time::Duration;

/// Resolved executables and limits for the built-in adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolsConfig {
    pub fish: PathBuf,
    pub fish_indent: PathBuf,
    /// Kill a tool that runs longer than this.
    pub timeout: Option<Duration>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            fish: PathBuf::from("fish"),
            fish_indent: PathBuf::from("fish_indent"),
            timeout: Some(Duration::from_secs(10)),
        }
    }
}
