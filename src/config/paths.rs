//! Cross-platform application paths using the `dirs` crate.
//!
//! Everything user-editable (`settings.toml`, `accounts.json`) lives in the
//! platform config directory; audio written by the `save` command defaults
//! to the platform data directory:
//!
//! | platform | config                           | exports                        |
//! |----------|----------------------------------|--------------------------------|
//! | Windows  | `%APPDATA%\image-to-speech\`     | `%LOCALAPPDATA%\...\exports\`  |
//! | macOS    | `~/Library/Application Support/` | same root, `exports/`          |
//! | Linux    | `~/.config/image-to-speech/`     | `~/.local/share/.../exports/`  |

use std::path::PathBuf;

const APP_NAME: &str = "image-to-speech";

/// Resolves a platform base directory to our per-app subdirectory, falling
/// back to the current directory when the platform cannot provide one.
fn app_dir(base: Option<PathBuf>) -> PathBuf {
    base.unwrap_or_else(|| PathBuf::from(".")).join(APP_NAME)
}

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml` and `accounts.json`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Full path to `accounts.json`.
    pub accounts_file: PathBuf,
    /// Default directory for audio saved via the `save` command.
    pub exports_dir: PathBuf,
}

impl AppPaths {
    /// Resolves all paths for this platform.
    pub fn new() -> Self {
        let config_dir = app_dir(dirs::config_dir());
        let settings_file = config_dir.join("settings.toml");
        let accounts_file = config_dir.join("accounts.json");
        let exports_dir = app_dir(dirs::data_local_dir()).join("exports");

        Self {
            config_dir,
            settings_file,
            accounts_file,
            exports_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_editable_files_share_the_config_dir() {
        let paths = AppPaths::new();
        assert_eq!(paths.settings_file.parent(), Some(paths.config_dir.as_path()));
        assert_eq!(paths.accounts_file.parent(), Some(paths.config_dir.as_path()));
        assert!(paths
            .settings_file
            .file_name()
            .is_some_and(|n| n == "settings.toml"));
        assert!(paths
            .accounts_file
            .file_name()
            .is_some_and(|n| n == "accounts.json"));
    }

    #[test]
    fn exports_resolve_even_without_platform_dirs() {
        // The "." fallback keeps every path non-empty on odd platforms.
        let paths = AppPaths::new();
        assert!(paths.exports_dir.to_str().is_some_and(|s| !s.is_empty()));
        assert!(paths.exports_dir.ends_with("exports"));
    }
}
