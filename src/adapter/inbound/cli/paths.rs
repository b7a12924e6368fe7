//! Path utilities.
//!
//! Tool-owned files live under `~/.remoting-ctl/`:
//! - `~/.remoting-ctl/config.toml` - main configuration
//! - `~/.remoting-ctl/build/` - default build source

use std::path::PathBuf;

/// Returns the tool home directory (`~/.remoting-ctl/`).
pub fn home_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".remoting-ctl")
}

/// Returns the default config file path (`~/.remoting-ctl/config.toml`).
pub fn default_config() -> PathBuf {
    home_dir().join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_lives_under_tool_home() {
        let config = default_config();
        assert!(config.starts_with(home_dir()));
        assert!(config.to_string_lossy().contains(".remoting-ctl"));
    }
}
