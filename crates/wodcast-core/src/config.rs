//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/wodcast/config.toml)
//! 3. Environment variables (WODCAST_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable prefix
const ENV_PREFIX: &str = "WODCAST";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the workout server (e.g. "http://192.168.1.20:8080/")
    #[serde(default)]
    pub server_url: Option<String>,

    /// Whether first-run setup has completed successfully
    #[serde(default)]
    pub setup_complete: bool,

    /// Directory for runtime data (log file)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: None,
            setup_complete: false,
            data_dir: default_data_dir(),
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (WODCAST_SERVER_URL, WODCAST_DATA_DIR)
    /// 2. Config file (~/.config/wodcast/config.toml or WODCAST_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // WODCAST_SERVER_URL
        if let Ok(val) = std::env::var(format!("{}_SERVER_URL", ENV_PREFIX)) {
            self.server_url = if val.is_empty() { None } else { Some(val) };
        }

        // WODCAST_DATA_DIR
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }
    }

    /// Forget the saved server, returning to the first-run state
    pub fn reset(&mut self) {
        self.server_url = None;
        self.setup_complete = false;
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_file_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with WODCAST_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wodcast")
            .join("config.toml")
    }

    /// Get the path to the log file
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("wodcast.log")
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wodcast")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap();
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            // Clear all the vars
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &["WODCAST_SERVER_URL", "WODCAST_DATA_DIR"];

    #[test]
    fn test_default_config() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config::default();
        assert!(config.server_url.is_none());
        assert!(!config.setup_complete);
        assert!(config.data_dir.ends_with("wodcast"));
    }

    #[test]
    fn test_env_override_server_url() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        assert!(config.server_url.is_none());

        env::set_var("WODCAST_SERVER_URL", "http://gym-pi:8080/");
        config.apply_env_overrides();
        assert_eq!(
            config.server_url,
            Some("http://gym-pi:8080/".to_string())
        );

        // Empty string clears it
        env::set_var("WODCAST_SERVER_URL", "");
        config.apply_env_overrides();
        assert!(config.server_url.is_none());
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("WODCAST_DATA_DIR", "/tmp/wodcast-test");
        config.apply_env_overrides();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/wodcast-test"));
        assert!(config.log_path().ends_with("wodcast.log"));
    }

    #[test]
    fn test_serialization_round_trip() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            server_url: Some("http://gym-pi:8080/".to_string()),
            setup_complete: true,
            data_dir: PathBuf::from("/data/wodcast"),
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("server_url"));
        assert!(toml_str.contains("setup_complete"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.server_url, config.server_url);
        assert_eq!(parsed.setup_complete, config.setup_complete);
        assert_eq!(parsed.data_dir, config.data_dir);
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            server_url = "http://10.0.0.5:8080/"
            setup_complete = true
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.server_url, Some("http://10.0.0.5:8080/".to_string()));
        assert!(config.setup_complete);
        assert!(config.data_dir.ends_with("wodcast"));
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        // Should return defaults when file doesn't exist
        assert!(config.server_url.is_none());
        assert!(!config.setup_complete);
    }

    #[test]
    fn test_reset() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config {
            server_url: Some("http://gym-pi:8080/".to_string()),
            setup_complete: true,
            data_dir: PathBuf::from("/data/wodcast"),
        };

        config.reset();
        assert!(config.server_url.is_none());
        assert!(!config.setup_complete);
        // Data dir survives a reset
        assert_eq!(config.data_dir, PathBuf::from("/data/wodcast"));
    }

    #[test]
    fn test_load_from_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "server_url = \"http://gym-pi:8080/\"\n").unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.server_url, Some("http://gym-pi:8080/".to_string()));
        assert!(!config.setup_complete);
    }
}
