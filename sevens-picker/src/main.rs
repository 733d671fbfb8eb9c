//! sevens-picker - random album service
//!
//! Loads the rated corpus, serves random enriched album batches and album
//! overviews over HTTP.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use sevens_common::config::{load_toml_config, resolve_config_path, resolve_data_folder};
use sevens_common::logging::init_tracing;
use sevens_picker::config::PickerSettings;
use sevens_picker::corpus::load_corpus;
use sevens_picker::services::{AlbumSampler, SpotifyCatalog, SummaryGenerator};
use sevens_picker::AppState;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "sevens-picker")]
#[command(about = "Random album picker service")]
#[command(version)]
struct Args {
    /// TOML config file (overrides SEVENS_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Data folder (overrides SEVENS_DATA_FOLDER and TOML)
    #[arg(long)]
    data_folder: Option<PathBuf>,

    /// Listen address, e.g. 127.0.0.1:5730
    #[arg(short, long)]
    bind: Option<String>,

    /// Corpus JSON file
    #[arg(long)]
    corpus: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref());
    let (config, origin) = load_toml_config(config_path.as_deref())?;
    init_tracing(&config.logging)?;
    origin.log();

    info!(
        "Starting sevens-picker v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let data_folder = resolve_data_folder(args.data_folder.as_deref(), &config);
    info!("Data folder: {}", data_folder.display());

    let settings = PickerSettings::resolve(
        &config,
        &data_folder,
        args.bind.as_deref(),
        args.corpus.as_deref(),
    )?;

    let corpus = load_corpus(&settings.corpus_path)?;

    let catalog = SpotifyCatalog::new(
        &settings.token_url,
        &settings.api_base_url,
        settings.catalog.clone(),
        settings.request_timeout,
    )?;
    let sampler = AlbumSampler::new(Arc::new(catalog));

    let summarizer = SummaryGenerator::new(
        &settings.summary_base_url,
        &settings.summary_model,
        settings.summary_api_key.clone(),
        settings.request_timeout,
    )?;
    info!(
        model = %summarizer.model(),
        enabled = summarizer.is_enabled(),
        "Summary generator ready"
    );

    let state = AppState::new(corpus, sampler, Arc::new(summarizer));
    let app = sevens_picker::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.bind_address).await?;
    info!("Listening on http://{}", settings.bind_address);
    info!("Health check: http://{}/health", settings.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("sevens-picker stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
