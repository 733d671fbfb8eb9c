//! Configuration resolution for sevens-picker
//!
//! Secrets resolve with ENV → TOML priority. Everything else comes from the
//! shared TOML bootstrap file, overridable from the command line.

use sevens_common::config::{non_blank, CatalogConfig, SummaryConfig, TomlConfig};
use sevens_common::{Error, Result};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::services::CatalogCredentials;

pub const SPOTIFY_CLIENT_ID_ENV: &str = "SPOTIFY_CLIENT_ID";
pub const SPOTIFY_CLIENT_SECRET_ENV: &str = "SPOTIFY_CLIENT_SECRET";
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Default corpus file name inside the data folder
pub const CORPUS_FILE: &str = "all-reviews.json";

/// Fully resolved service settings
#[derive(Debug, Clone)]
pub struct PickerSettings {
    pub bind_address: SocketAddr,
    pub corpus_path: PathBuf,
    pub request_timeout: Duration,
    pub catalog: CatalogCredentials,
    pub token_url: String,
    pub api_base_url: String,
    pub summary_api_key: Option<String>,
    pub summary_model: String,
    pub summary_base_url: String,
}

impl PickerSettings {
    /// Resolve settings from the TOML file, the environment and CLI overrides
    pub fn resolve(
        config: &TomlConfig,
        data_folder: &Path,
        bind_override: Option<&str>,
        corpus_override: Option<&Path>,
    ) -> Result<Self> {
        let bind = bind_override.unwrap_or(&config.picker.bind_address);
        let bind_address = bind
            .parse()
            .map_err(|e| Error::Config(format!("Invalid bind address '{}': {}", bind, e)))?;

        Ok(Self {
            bind_address,
            corpus_path: resolve_corpus_path(corpus_override, config, data_folder),
            request_timeout: Duration::from_secs(config.picker.request_timeout_secs.max(1)),
            catalog: resolve_catalog_credentials(&config.catalog)?,
            token_url: config.catalog.token_url.clone(),
            api_base_url: config.catalog.api_base_url.clone(),
            summary_api_key: resolve_summary_api_key(&config.summary),
            summary_model: config.summary.model.clone(),
            summary_base_url: config.summary.base_url.clone(),
        })
    }
}

/// Corpus path: CLI → TOML `picker.corpus_path` → `<data folder>/all-reviews.json`
pub fn resolve_corpus_path(
    cli_arg: Option<&Path>,
    config: &TomlConfig,
    data_folder: &Path,
) -> PathBuf {
    cli_arg
        .map(Path::to_path_buf)
        .or_else(|| config.picker.corpus_path.clone())
        .unwrap_or_else(|| data_folder.join(CORPUS_FILE))
}

/// Resolve one secret with ENV → TOML priority
///
/// Blank values count as absent. Warns when more than one source is set.
pub fn resolve_secret(label: &str, env_var: &str, toml_value: Option<&String>) -> Option<String> {
    let env_value = non_blank(std::env::var(env_var).ok());
    let toml_value = non_blank(toml_value.cloned());

    if env_value.is_some() && toml_value.is_some() {
        warn!(
            "{} found in multiple sources: environment, TOML. Using environment (highest priority).",
            label
        );
    }

    if let Some(value) = env_value {
        info!("{} loaded from environment variable", label);
        return Some(value);
    }

    if let Some(value) = toml_value {
        info!("{} loaded from TOML config", label);
        return Some(value);
    }

    None
}

/// Catalog client credentials; both halves are required
pub fn resolve_catalog_credentials(config: &CatalogConfig) -> Result<CatalogCredentials> {
    let client_id = resolve_secret(
        "Spotify client id",
        SPOTIFY_CLIENT_ID_ENV,
        config.client_id.as_ref(),
    );
    let client_secret = resolve_secret(
        "Spotify client secret",
        SPOTIFY_CLIENT_SECRET_ENV,
        config.client_secret.as_ref(),
    );

    match (client_id, client_secret) {
        (Some(client_id), Some(client_secret)) => Ok(CatalogCredentials {
            client_id,
            client_secret,
        }),
        _ => Err(Error::Config(format!(
            "Spotify credentials not configured. Set both of:\n\
             1. Environment: {}=... and {}=...\n\
             2. TOML config: [catalog] client_id = \"...\", client_secret = \"...\"",
            SPOTIFY_CLIENT_ID_ENV, SPOTIFY_CLIENT_SECRET_ENV
        ))),
    }
}

/// Summary API key; absence disables overviews without failing startup
pub fn resolve_summary_api_key(config: &SummaryConfig) -> Option<String> {
    let toml_key = config.api_key.as_ref();
    let key = resolve_secret("OpenAI API key", OPENAI_API_KEY_ENV, toml_key);
    if key.is_none() {
        warn!(
            "OpenAI API key not configured ({} or [summary] api_key); album overviews are disabled",
            OPENAI_API_KEY_ENV
        );
    }
    key
}
