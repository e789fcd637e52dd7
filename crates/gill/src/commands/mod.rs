//! CLI command implementations - one module per top-level command.

pub mod fmt;
pub mod init;
pub mod lint;
pub mod tools;
