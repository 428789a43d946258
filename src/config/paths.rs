use std::path::{Path, PathBuf};

const APP_DIR: &str = "nba_warehouse";

/// Returns the platform-specific path for the config file.
///
/// # Notes
/// - Uses platform-specific config directory (e.g., ~/.config on Linux)
/// - Falls back to current directory if config directory is unavailable
pub fn get_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| Path::new(".").to_path_buf())
        .join(APP_DIR)
        .join("config.toml")
}

/// Returns the platform-specific path for the log directory.
pub fn get_log_dir_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| Path::new(".").to_path_buf())
        .join(APP_DIR)
        .join("logs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_layout() {
        let path = get_config_path();
        assert!(path.ends_with("nba_warehouse/config.toml"));
    }

    #[test]
    fn test_log_dir_layout() {
        let path = get_log_dir_path();
        assert!(path.ends_with("nba_warehouse/logs"));
    }
}
