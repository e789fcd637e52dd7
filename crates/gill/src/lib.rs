//! Gill - fish shell linting and formatting for editors and the command line.
//!
//! Wraps the fish interpreter's own syntax checker (`fish -n`) and formatter
//! (`fish_indent`):
//! - `gill lint` / `gill fmt` for scripts on disk
//! - `gill serve` for a language server publishing diagnostics and formatting
//!   open buffers
//!
//! # Example
//!
//! ```ignore
//! use gill::config::GillConfig;
//! use gill_tools::ToolRegistry;
//!
//! let config = GillConfig::load(std::path::Path::new("."));
//! let registry = ToolRegistry::from_config(&config.tools.to_tools_config());
//! ```

pub mod commands;
pub mod config;
pub mod logging;
pub mod output;
pub mod serve;
