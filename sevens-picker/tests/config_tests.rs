//! Unit tests for picker configuration resolution
//!
//! Uses serial_test to prevent ENV variable race conditions. Tests that
//! manipulate SPOTIFY_* or OPENAI_API_KEY are marked with #[serial].

use serial_test::serial;
use sevens_common::config::{CatalogConfig, SummaryConfig, TomlConfig};
use sevens_common::Error;
use sevens_picker::config::{
    resolve_catalog_credentials, resolve_corpus_path, resolve_secret, resolve_summary_api_key,
    PickerSettings, CORPUS_FILE, OPENAI_API_KEY_ENV, SPOTIFY_CLIENT_ID_ENV,
    SPOTIFY_CLIENT_SECRET_ENV,
};
use std::path::{Path, PathBuf};

fn clear_env() {
    std::env::remove_var(SPOTIFY_CLIENT_ID_ENV);
    std::env::remove_var(SPOTIFY_CLIENT_SECRET_ENV);
    std::env::remove_var(OPENAI_API_KEY_ENV);
}

fn catalog_config(id: Option<&str>, secret: Option<&str>) -> CatalogConfig {
    CatalogConfig {
        client_id: id.map(str::to_string),
        client_secret: secret.map(str::to_string),
        ..Default::default()
    }
}

#[test]
#[serial]
fn test_env_overrides_toml() {
    clear_env();
    std::env::set_var("SEVENS_TEST_SECRET", "env-value");

    let toml_value = "toml-value".to_string();
    let resolved = resolve_secret("test secret", "SEVENS_TEST_SECRET", Some(&toml_value));

    assert_eq!(resolved.as_deref(), Some("env-value"));
    std::env::remove_var("SEVENS_TEST_SECRET");
}

#[test]
#[serial]
fn test_toml_used_when_env_missing_or_blank() {
    clear_env();
    let toml_value = "toml-value".to_string();

    assert_eq!(
        resolve_secret("test secret", "SEVENS_TEST_SECRET", Some(&toml_value)).as_deref(),
        Some("toml-value")
    );

    std::env::set_var("SEVENS_TEST_SECRET", "   ");
    assert_eq!(
        resolve_secret("test secret", "SEVENS_TEST_SECRET", Some(&toml_value)).as_deref(),
        Some("toml-value")
    );
    std::env::remove_var("SEVENS_TEST_SECRET");
}

#[test]
#[serial]
fn test_blank_everywhere_is_none() {
    clear_env();
    let blank = "".to_string();
    assert!(resolve_secret("test secret", "SEVENS_TEST_SECRET", Some(&blank)).is_none());
    assert!(resolve_secret("test secret", "SEVENS_TEST_SECRET", None).is_none());
}

#[test]
#[serial]
fn test_catalog_credentials_from_toml() {
    clear_env();
    let creds = resolve_catalog_credentials(&catalog_config(Some("id"), Some("secret"))).unwrap();
    assert_eq!(creds.client_id, "id");
    assert_eq!(creds.client_secret, "secret");
}

#[test]
#[serial]
fn test_catalog_credentials_mixed_sources() {
    clear_env();
    std::env::set_var(SPOTIFY_CLIENT_SECRET_ENV, "env-secret");

    let config = catalog_config(Some("id"), Some("toml-secret"));
    let creds = resolve_catalog_credentials(&config).unwrap();
    assert_eq!(creds.client_id, "id");
    assert_eq!(creds.client_secret, "env-secret");

    clear_env();
}

#[test]
#[serial]
fn test_missing_catalog_credentials_is_config_error() {
    clear_env();
    let result = resolve_catalog_credentials(&catalog_config(Some("id"), None));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_missing_summary_key_is_not_an_error() {
    clear_env();
    assert!(resolve_summary_api_key(&SummaryConfig::default()).is_none());

    std::env::set_var(OPENAI_API_KEY_ENV, "sk-env");
    assert_eq!(
        resolve_summary_api_key(&SummaryConfig::default()).as_deref(),
        Some("sk-env")
    );
    clear_env();
}

#[test]
fn test_corpus_path_priority() {
    let data_folder = Path::new("/data/sevens");
    let mut config = TomlConfig::default();

    assert_eq!(
        resolve_corpus_path(None, &config, data_folder),
        data_folder.join(CORPUS_FILE)
    );

    config.picker.corpus_path = Some(PathBuf::from("/srv/reviews.json"));
    assert_eq!(
        resolve_corpus_path(None, &config, data_folder),
        PathBuf::from("/srv/reviews.json")
    );

    assert_eq!(
        resolve_corpus_path(Some(Path::new("/tmp/cli.json")), &config, data_folder),
        PathBuf::from("/tmp/cli.json")
    );
}

#[test]
#[serial]
fn test_settings_resolution() {
    clear_env();
    let mut config = TomlConfig::default();
    config.catalog = catalog_config(Some("id"), Some("secret"));

    let bind = Some("0.0.0.0:8080");
    let settings = PickerSettings::resolve(&config, Path::new("/data"), bind, None).unwrap();
    assert_eq!(settings.bind_address.port(), 8080);
    assert_eq!(settings.request_timeout.as_secs(), 30);
    assert_eq!(settings.summary_model, "gpt-4o-mini");
    assert!(settings.summary_api_key.is_none());

    let bad = PickerSettings::resolve(&config, Path::new("/data"), Some("not-an-addr"), None);
    assert!(matches!(bad, Err(Error::Config(_))));
}
