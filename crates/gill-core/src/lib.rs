//! Shared types and utilities for gill crates.

mod merge;
mod paths;

pub use merge::Merge;
pub use paths::{global_config_dir, project_config_dir};
