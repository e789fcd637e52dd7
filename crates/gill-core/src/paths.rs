//! Config directory lookup.

use std::path::{Path, PathBuf};

/// Global config directory: `$XDG_CONFIG_HOME/gill`, else `~/.config/gill`.
pub fn global_config_dir() -> Option<PathBuf> {
    let config_home = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))?;
    Some(config_home.join("gill"))
}

/// Per-project config directory (`<root>/.gill`).
pub fn project_config_dir(root: &Path) -> PathBuf {
    root.join(".gill")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_config_dir() {
        assert_eq!(
            project_config_dir(Path::new("/tmp/proj")),
            PathBuf::from("/tmp/proj/.gill")
        );
    }
}
