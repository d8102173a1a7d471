//! Configuration settings for algodesk.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Prefix for environment overrides, e.g. `ALGODESK__API__BASE_URL`.
const ENV_PREFIX: &str = "ALGODESK";

/// Main configuration struct.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API configuration.
    pub api: ApiConfig,
    /// Request executor defaults.
    pub requests: RequestConfig,
    /// Sign-in credentials used when no session is stored.
    pub auth: AuthConfig,
    /// UI configuration.
    pub ui: UiConfig,
    /// Key bindings.
    pub keybindings: KeyBindings,
}

impl Config {
    /// Load configuration from file, returning default if file doesn't exist.
    pub fn load_or_default() -> crate::Result<Self> {
        Self::load(None)
    }

    /// Load configuration from file, then apply `ALGODESK__*` environment
    /// overrides.
    pub fn load(path: Option<PathBuf>) -> crate::Result<Self> {
        let config_path = path.unwrap_or_else(default_config_path);

        let settings = config::Config::builder()
            .add_source(config::File::from(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Save configuration to file.
    pub fn save(&self, path: Option<PathBuf>) -> crate::Result<()> {
        let config_path = path.unwrap_or_else(default_config_path);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::config(e.to_string()))?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }
}

fn default_config_path() -> PathBuf {
    super::config_dir()
        .map(|p| p.join("config.toml"))
        .unwrap_or_else(|_| PathBuf::from("config.toml"))
}

/// API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Backend base URL.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Path to the stored session file (optional).
    pub session_path: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 30,
            session_path: None,
        }
    }
}

impl ApiConfig {
    /// Request timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Retry and notification defaults for request executors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    /// Maximum automatic retries for network and 5xx failures.
    pub max_retries: u32,
    /// Fixed delay between attempts in milliseconds.
    pub retry_delay_ms: u64,
    /// Show a loading toast while a call is in flight.
    pub show_loading_toast: bool,
    /// Show an error toast when a call finally fails.
    pub show_error_toast: bool,
    /// Text of the loading toast.
    pub loading_message: String,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_ms: 1000,
            show_loading_toast: true,
            show_error_toast: true,
            loading_message: "Loading...".to_string(),
        }
    }
}

/// Sign-in credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Account email.
    pub email: Option<String>,
    /// Account password. Prefer `ALGODESK__AUTH__PASSWORD` over the file.
    #[serde(skip_serializing)]
    pub password: Option<String>,
}

impl AuthConfig {
    /// Both email and password, if configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.email, &self.password) {
            (Some(email), Some(password)) => Some((email.as_str(), password.as_str())),
            _ => None,
        }
    }
}

/// UI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Tick rate in milliseconds for UI updates.
    pub tick_rate_ms: u64,
    /// Enable mouse support.
    pub mouse_support: bool,
    /// Auto-refresh interval in seconds (0 to disable).
    pub auto_refresh_secs: u64,
    /// Portfolio history period requested for the account view.
    pub history_period: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 250,
            mouse_support: true,
            auto_refresh_secs: 30,
            history_period: "1M".to_string(),
        }
    }
}

/// Key bindings configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    /// Quit the application.
    pub quit: String,
    /// Show help.
    pub help: String,
    /// Navigate up.
    pub up: String,
    /// Navigate down.
    pub down: String,
    /// Refresh data.
    pub refresh: String,
    /// Switch to account view.
    pub account: String,
    /// Switch to positions view.
    pub positions: String,
    /// Switch to orders view.
    pub orders: String,
    /// Switch to trades view.
    pub trades: String,
    /// Switch to algorithms view.
    pub algorithms: String,
    /// Cancel the selected order.
    pub cancel_order: String,
    /// Activate/deactivate the selected algorithm.
    pub toggle_algorithm: String,
    /// Run a crossover check for the selected algorithm.
    pub run_algorithm: String,
    /// Start/stop automated trading.
    pub toggle_automation: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: "q".to_string(),
            help: "?".to_string(),
            up: "k".to_string(),
            down: "j".to_string(),
            refresh: "r".to_string(),
            account: "1".to_string(),
            positions: "2".to_string(),
            orders: "3".to_string(),
            trades: "4".to_string(),
            algorithms: "5".to_string(),
            cancel_order: "x".to_string(),
            toggle_algorithm: "t".to_string(),
            run_algorithm: "g".to_string(),
            toggle_automation: "a".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.requests.max_retries, 3);
        assert_eq!(config.requests.retry_delay_ms, 1000);
        assert!(config.requests.show_loading_toast);
        assert!(config.requests.show_error_toast);
        assert!(config.auth.credentials().is_none());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[api]\nbase_url = \"https://trading.example.com\"\n\n[requests]\nmax_retries = 5\nshow_error_toast = false\n",
        )
        .unwrap();

        let config = Config::load(Some(path)).unwrap();
        assert_eq!(config.api.base_url, "https://trading.example.com");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.requests.max_retries, 5);
        assert!(!config.requests.show_error_toast);
        assert_eq!(config.requests.retry_delay_ms, 1000);
    }

    #[test]
    fn test_save_round_trip_skips_password() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.auth.email = Some("trader@example.com".to_string());
        config.auth.password = Some("hunter2".to_string());

        config.save(Some(path.clone())).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("trader@example.com"));
        assert!(!written.contains("hunter2"));
    }
}
