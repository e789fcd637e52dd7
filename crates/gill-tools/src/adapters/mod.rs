//! Tool adapters.
//!
//! Each adapter wraps an external binary and provides:
//! - Availability detection
//! - Invocation (file-based and stdin-based)
//! - Output parsing to diagnostics

mod fish;
mod fish_indent;

pub use fish::{FishLint, parse_syntax_errors};
pub use fish_indent::{FishIndent, first_differing_line};

use crate::{Tool, ToolsConfig};
use std::sync::Arc;

/// All built-in adapters, configured from `config`.
pub fn all_adapters(config: &ToolsConfig) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(FishLint::with_executable(&config.fish, config.timeout)),
        Arc::new(FishIndent::with_executable(
            &config.fish_indent,
            config.timeout,
        )),
    ]
}
