//! Initialize gill in a project directory.

use std::fs;
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# gill configuration

[tools]
# fish = "fish"
# fish_indent = "fish_indent"
# timeout_ms = 10000

[lint]
# on_open = true
# on_save = true
# on_change = false
# debounce_ms = 300

[format]
# enabled = true
"#;

/// Create `.gill/config.toml` with commented defaults.
pub fn run(root: Option<&Path>) -> i32 {
    let root = root.unwrap_or_else(|| Path::new("."));
    match cmd_init(root) {
        Ok(true) => {
            println!("Created .gill/config.toml");
            0
        }
        Ok(false) => {
            println!("Already initialized.");
            0
        }
        Err(e) => {
            eprintln!("Failed to initialize: {e}");
            1
        }
    }
}

/// Returns whether a config file was written.
fn cmd_init(root: &Path) -> std::io::Result<bool> {
    let dir = gill_core::project_config_dir(root);
    let config_path = dir.join("config.toml");
    if config_path.exists() {
        return Ok(false);
    }
    fs::create_dir_all(&dir)?;
    fs::write(&config_path, DEFAULT_CONFIG)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GillConfig;

    #[test]
    fn test_init_writes_loadable_config_once() {
        let dir = tempfile::tempdir().unwrap();
        assert!(cmd_init(dir.path()).unwrap());
        assert!(!cmd_init(dir.path()).unwrap());

        let path = dir.path().join(".gill/config.toml");
        let config = GillConfig::load_file(&path).unwrap().unwrap();
        assert_eq!(config, GillConfig::default());
    }
}
