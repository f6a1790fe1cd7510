//! Configuration file handling.
//!
//! Settings are read from a TOML file. A missing file means defaults.
//!
//! # Configuration Location
//!
//! - Linux: `~/.config/instsoft/config.toml`
//! - macOS: `~/Library/Application Support/instsoft/config.toml`
//! - Windows: `%APPDATA%\instsoft\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! probe_architecture = true
//! product_name_fallback = false
//! show_progress = true
//! registry_backend = "powershell"   # or "reg-exe"
//! reg_exe = 'C:\Windows\System32\reg.exe'
//! powershell_exe = 'C:\Windows\System32\WindowsPowerShell\v1.0\powershell.exe'
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::platform::{default_powershell_exe, default_reg_exe};
use crate::registry::Backend;

/// Application configuration.
///
/// # Example
///
/// ```no_run
/// use instsoft::Config;
///
/// let config = Config::load()?;
/// println!("Probe architecture: {}", config.probe_architecture);
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Whether to ask the target for its architecture. When false the host
    /// is assumed to be 32-bit and the WOW64 location is not scanned.
    ///
    /// Default: true
    pub probe_architecture: bool,

    /// Whether Windows Installer product keys without `DisplayName` should
    /// be named from their `ProductName` value.
    ///
    /// Default: false
    pub product_name_fallback: bool,

    /// Whether to show a spinner on stderr while scanning.
    ///
    /// Default: true
    pub show_progress: bool,

    /// How the registry is read.
    ///
    /// Default: `powershell`
    pub registry_backend: Backend,

    /// Path of the `reg.exe` tool.
    pub reg_exe: String,

    /// Path of the PowerShell executable, used for the architecture probe
    /// and the `powershell` backend.
    pub powershell_exe: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            probe_architecture: true,
            product_name_fallback: false,
            show_progress: true,
            registry_backend: Backend::default(),
            reg_exe: default_reg_exe(),
            powershell_exe: default_powershell_exe(),
        }
    }
}

impl Config {
    /// Loads configuration from the default config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from `path`, or defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Returns the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("instsoft")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert!(config.probe_architecture);
        assert!(!config.product_name_fallback);
        assert!(config.show_progress);
        assert_eq!(config.registry_backend, Backend::PowerShell);
        assert_eq!(config.reg_exe, default_reg_exe());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "product_name_fallback = true\nshow_progress = false\n").unwrap();

        let config = Config::load_from(&path).unwrap();

        assert!(config.product_name_fallback);
        assert!(!config.show_progress);
        assert!(config.probe_architecture);
        assert_eq!(config.powershell_exe, default_powershell_exe());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "probe_architecture = \"maybe\"").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_windows_paths_in_literal_strings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "reg_exe = 'D:\\Tools\\reg.exe'\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.reg_exe, r"D:\Tools\reg.exe");
    }

    #[test]
    fn test_reg_exe_backend_is_selectable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "registry_backend = \"reg-exe\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.registry_backend, Backend::RegExe);
    }
}
