//! Language server for editor integration.
//!
//! The server lints fish documents on open/save/change and formats them on
//! request, delegating all real work to `fish -n` and `fish_indent`.

use clap::Args;
use gill_derive::Merge;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

mod convert;
mod debounce;
mod documents;
pub mod lsp;
#[cfg(all(test, unix))]
mod lsp_tests;

pub use convert::{full_document_range, to_lsp_diagnostic};
pub use debounce::{Debouncer, Ticket};
pub use documents::{Document, DocumentStore, is_fish_document};

/// When to lint, from `[lint]` in config.toml.
#[derive(Debug, Clone, Deserialize, Default, Merge, PartialEq, Eq)]
#[serde(default)]
pub struct LintConfig {
    /// Lint when a document is opened. Default: true
    pub on_open: Option<bool>,
    /// Lint when a document is saved. Default: true
    pub on_save: Option<bool>,
    /// Lint unsaved buffers on every edit. Default: false
    pub on_change: Option<bool>,
    /// Quiet period before a lint runs. Default: 300
    pub debounce_ms: Option<u64>,
}

impl LintConfig {
    pub fn on_open(&self) -> bool {
        self.on_open.unwrap_or(true)
    }

    pub fn on_save(&self) -> bool {
        self.on_save.unwrap_or(true)
    }

    pub fn on_change(&self) -> bool {
        self.on_change.unwrap_or(false)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms.unwrap_or(300))
    }
}

/// `[format]` in config.toml.
#[derive(Debug, Clone, Deserialize, Default, Merge, PartialEq, Eq)]
#[serde(default)]
pub struct FormatConfig {
    /// Offer document formatting. Default: true
    pub enabled: Option<bool>,
}

impl FormatConfig {
    pub fn enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

/// Serve command arguments
#[derive(Args)]
pub struct ServeArgs {
    /// Communicate over stdin/stdout (the only transport; accepted for
    /// editors that always pass it)
    #[arg(long)]
    pub stdio: bool,
}

/// Run the language server until the client disconnects.
pub fn run(_args: ServeArgs, root: Option<&Path>) -> i32 {
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start async runtime: {e}");
            return 1;
        }
    };
    rt.block_on(lsp::run_lsp_server(root))
}
