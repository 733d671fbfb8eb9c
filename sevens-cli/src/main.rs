//! sevens - pick a random well-reviewed album
//!
//! Command-line client for sevens-picker. History, preferences and the
//! lifetime spin counter live in the local data folder.

use anyhow::Result;
use clap::{Parser, Subcommand};
use sevens_common::config::{load_toml_config, resolve_config_path, resolve_data_folder};
use sevens_common::logging::init_tracing;
use sevens_common::AlbumIdentity;
use std::path::PathBuf;

use sevens_cli::commands;
use sevens_cli::{ClientSession, HistoryFilter, PickOptions};

#[derive(Parser, Debug)]
#[command(name = "sevens")]
#[command(about = "Pick a random well-reviewed album")]
#[command(version)]
struct Cli {
    /// TOML config file (overrides SEVENS_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Data folder (overrides SEVENS_DATA_FOLDER and TOML)
    #[arg(long, global = true)]
    data_folder: Option<PathBuf>,

    /// Picker service URL
    #[arg(long, global = true, env = "SEVENS_PICKER_URL")]
    picker_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Picks a random album, adds it to history and counts the spin.
    Pick {
        /// Minimum critic score (0-10); defaults to the stored preference, then 7
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=10))]
        min_rating: Option<u8>,

        /// Also consider albums already logged
        #[arg(long)]
        include_logged: bool,

        /// Request an overview of the picked album
        #[arg(long)]
        summary: bool,

        /// How many albums of the batch to list
        #[arg(long, default_value_t = 1)]
        count: usize,
    },

    /// Marks an album as listened to.
    Log { artist: String, title: String },

    /// Clears the listened-to mark.
    Unlog { artist: String, title: String },

    /// Marks an album as liked.
    Like { artist: String, title: String },

    /// Clears the liked mark.
    Unlike { artist: String, title: String },

    /// Deletes an album from history.
    Remove { artist: String, title: String },

    /// Lists history entries.
    History {
        #[arg(long)]
        logged: bool,
        #[arg(long)]
        liked: bool,
    },

    /// Shows or sets the stored minimum rating.
    Rating { value: Option<i64> },

    /// Shows the lifetime spin count.
    Spins,

    /// Writes all local data to a JSON file.
    Export { file: PathBuf },

    /// Restores local data from a JSON file.
    Import { file: PathBuf },

    /// Erases all local data.
    Reset {
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = resolve_config_path(cli.config.as_deref());
    let (config, origin) = load_toml_config(config_path.as_deref())?;
    init_tracing(&config.logging)?;
    origin.log();

    let data_folder = resolve_data_folder(cli.data_folder.as_deref(), &config);
    let picker_url = cli
        .picker_url
        .clone()
        .unwrap_or_else(|| config.picker.url.clone());
    let session = ClientSession::open(&config, &data_folder, &picker_url).await?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Pick {
            min_rating,
            include_logged,
            summary,
            count,
        } => {
            let options = PickOptions {
                min_rating,
                include_logged,
                summary,
                count: count.max(1),
            };
            commands::pick(&session, &options, &mut out).await?;
        }
        Command::Log { artist, title } => {
            let album = AlbumIdentity::new(artist, title);
            commands::set_logged(&session, &album, true, &mut out).await?;
        }
        Command::Unlog { artist, title } => {
            let album = AlbumIdentity::new(artist, title);
            commands::set_logged(&session, &album, false, &mut out).await?;
        }
        Command::Like { artist, title } => {
            let album = AlbumIdentity::new(artist, title);
            commands::set_liked(&session, &album, true, &mut out).await?;
        }
        Command::Unlike { artist, title } => {
            let album = AlbumIdentity::new(artist, title);
            commands::set_liked(&session, &album, false, &mut out).await?;
        }
        Command::Remove { artist, title } => {
            let album = AlbumIdentity::new(artist, title);
            commands::remove(&session, &album, &mut out).await?;
        }
        Command::History { logged, liked } => {
            let filter = HistoryFilter {
                logged_only: logged,
                liked_only: liked,
            };
            commands::history(&session, filter, &mut out).await?;
        }
        Command::Rating { value } => commands::rating(&session, value, &mut out).await?,
        Command::Spins => commands::spins(&session, &mut out).await?,
        Command::Export { file } => commands::export(&session, &file, &mut out).await?,
        Command::Import { file } => commands::import(&session, &file, &mut out).await?,
        Command::Reset { yes } => commands::reset(&session, yes, &mut out).await?,
    }

    Ok(())
}
