//! Configuration loading and data folder resolution
//!
//! One TOML bootstrap file is shared by the picker service and the client.
//! Every section is optional; a missing file is not an error and yields the
//! compiled defaults.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "SEVENS_CONFIG";
/// Environment variable naming the data folder
pub const DATA_FOLDER_ENV_VAR: &str = "SEVENS_DATA_FOLDER";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Folder holding local storage files
    #[serde(default)]
    pub data_folder: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub picker: PickerConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub summary: SummaryConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Which backend holds the client's primary store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Json,
    Sqlite,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
}

/// Picker service location and corpus
#[derive(Debug, Clone, Deserialize)]
pub struct PickerConfig {
    /// Address the service binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Base URL the client uses to reach the service
    #[serde(default = "default_picker_url")]
    pub url: String,

    /// Rated album corpus (JSON array)
    #[serde(default)]
    pub corpus_path: Option<PathBuf>,

    /// Timeout applied to every outbound HTTP request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            url: default_picker_url(),
            corpus_path: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Spotify catalog access
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_catalog_api_url")]
    pub api_base_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            token_url: default_token_url(),
            api_base_url: default_catalog_api_url(),
        }
    }
}

/// Text-generation service access
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_summary_model")]
    pub model: String,
    #[serde(default = "default_summary_url")]
    pub base_url: String,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_summary_model(),
            base_url: default_summary_url(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_bind_address() -> String {
    "127.0.0.1:5730".to_string()
}

fn default_picker_url() -> String {
    "http://127.0.0.1:5730".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_token_url() -> String {
    "https://accounts.spotify.com/api/token".to_string()
}

fn default_catalog_api_url() -> String {
    "https://api.spotify.com/v1".to_string()
}

fn default_summary_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_summary_url() -> String {
    "https://api.openai.com/v1".to_string()
}

/// Config file resolution:
/// 1. Command-line argument (highest priority)
/// 2. `SEVENS_CONFIG` environment variable
/// 3. Platform config directory (`<config dir>/sevens/config.toml`)
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir().map(|d| d.join("sevens").join("config.toml"))
}

/// Where the loaded configuration came from
///
/// Returned alongside the config so callers can report it once logging is up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    File(PathBuf),
    /// Resolved path does not exist; defaults in use
    Missing(PathBuf),
    /// No config location could be resolved; defaults in use
    Unresolved,
}

impl ConfigOrigin {
    pub fn log(&self) {
        match self {
            ConfigOrigin::File(path) => info!("Config loaded from {}", path.display()),
            ConfigOrigin::Missing(path) => {
                warn!("Config file not found: {}, using defaults", path.display())
            }
            ConfigOrigin::Unresolved => warn!("No config file location available, using defaults"),
        }
    }
}

/// Load TOML configuration
///
/// A missing file returns defaults. A file that exists but does not parse is a
/// configuration error.
pub fn load_toml_config(path: Option<&Path>) -> Result<(TomlConfig, ConfigOrigin)> {
    let Some(path) = path else {
        return Ok((TomlConfig::default(), ConfigOrigin::Unresolved));
    };

    if !path.exists() {
        return Ok((TomlConfig::default(), ConfigOrigin::Missing(path.to_path_buf())));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;

    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;
    Ok((config, ConfigOrigin::File(path.to_path_buf())))
}

/// Data folder resolution:
/// 1. Command-line argument (highest priority)
/// 2. `SEVENS_DATA_FOLDER` environment variable
/// 3. TOML `data_folder`
/// 4. OS-dependent default (fallback)
pub fn resolve_data_folder(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(DATA_FOLDER_ENV_VAR) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.data_folder {
        return path.clone();
    }

    default_data_folder()
}

/// OS-dependent default data folder
pub fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("sevens"))
        .unwrap_or_else(|| PathBuf::from("./sevens_data"))
}

/// Treat blank or whitespace-only values as unset
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: TomlConfig = toml::from_str("").unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.storage.backend, StorageBackend::Json);
        assert_eq!(config.picker.bind_address, "127.0.0.1:5730");
        assert_eq!(config.picker.request_timeout_secs, 30);
        assert_eq!(config.summary.model, "gpt-4o-mini");
        assert_eq!(
            config.catalog.token_url,
            "https://accounts.spotify.com/api/token"
        );
    }

    #[test]
    fn test_partial_sections() {
        let config: TomlConfig = toml::from_str(
            r#"
            [storage]
            backend = "sqlite"

            [catalog]
            client_id = "abc"
            "#,
        )
        .unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.catalog.client_id.as_deref(), Some("abc"));
        assert!(config.catalog.client_secret.is_none());
        assert_eq!(config.catalog.api_base_url, "https://api.spotify.com/v1");
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let parsed = toml::from_str::<TomlConfig>("[storage]\nbackend = \"cookies\"\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  ".to_string())), None);
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some("k".to_string())).as_deref(), Some("k"));
    }
}
