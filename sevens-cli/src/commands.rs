//! User-facing commands
//!
//! Each command reads and writes through the [`ClientSession`] and prints to
//! the given writer, so tests can capture output.

use anyhow::{bail, Result};
use sevens_common::backup::{export_user_data, import_user_data, reset_user_data, UserData};
use sevens_common::preference::{is_valid_min_rating, MIN_RATING_CEILING, MIN_RATING_FLOOR};
use sevens_common::{AlbumIdentity, EnrichedAlbum, HistoryEntry, ImageSize};
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

use crate::picker_client::PickerError;
use crate::session::ClientSession;

/// Threshold used until the user stores one
pub const DEFAULT_MIN_RATING: u8 = 7;

/// Options for [`pick`]
#[derive(Debug, Clone)]
pub struct PickOptions {
    pub min_rating: Option<u8>,
    pub include_logged: bool,
    pub summary: bool,
    pub count: usize,
}

impl Default for PickOptions {
    fn default() -> Self {
        Self {
            min_rating: None,
            include_logged: false,
            summary: false,
            count: 1,
        }
    }
}

/// What a pick produced
#[derive(Debug)]
pub enum PickOutcome {
    /// First album of the batch, now in history
    Picked(EnrichedAlbum),
    NothingLeft,
    /// Every candidate failed catalog lookup
    NoMatches,
}

/// Which history entries to list
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryFilter {
    pub logged_only: bool,
    pub liked_only: bool,
}

/// Threshold for a pick: explicit flag, then stored preference, then the default
pub async fn effective_min_rating(session: &ClientSession, flag: Option<u8>) -> Result<u8> {
    if let Some(rating) = flag {
        return Ok(rating);
    }
    Ok(session
        .preferences
        .get_min_rating()
        .await?
        .unwrap_or(DEFAULT_MIN_RATING))
}

/// Pick a random album, record it in history and count the spin
pub async fn pick(
    session: &ClientSession,
    options: &PickOptions,
    out: &mut dyn Write,
) -> Result<PickOutcome> {
    let min_rating = effective_min_rating(session, options.min_rating).await?;
    if !is_valid_min_rating(min_rating as i64) {
        bail!(
            "Minimum rating must be between {} and {}, got {}",
            MIN_RATING_FLOOR,
            MIN_RATING_CEILING,
            min_rating
        );
    }

    let excluded = if options.include_logged {
        Vec::new()
    } else {
        session.history.logged_identities().await?
    };

    let batch = match session.picker.random_albums(min_rating, &excluded).await {
        Ok(batch) => batch,
        Err(PickerError::PoolExhausted) => {
            info!(min_rating, excluded = excluded.len(), "Pool exhausted");
            writeln!(out, "nothing left to pick")?;
            return Ok(PickOutcome::NothingLeft);
        }
        Err(e) => return Err(e.into()),
    };

    let Some(first) = batch.first().cloned() else {
        writeln!(
            out,
            "No albums could be matched in the catalog this time, try again"
        )?;
        return Ok(PickOutcome::NoMatches);
    };

    session
        .history
        .add(first.to_history_entry(false, false))
        .await?;
    let spins = session.spins.increment().await?;
    info!(album = %first.identity(), spins, "Picked album");

    print_album(out, &first)?;

    if options.summary {
        match session.picker.album_overview(&first).await {
            Ok(overview) => writeln!(out, "\n{}\n", overview)?,
            Err(e) => {
                warn!(album = %first.identity(), error = %e, "Overview unavailable");
                writeln!(out, "(overview unavailable)")?;
            }
        }
    }

    let others: Vec<_> = batch
        .iter()
        .skip(1)
        .take(options.count.saturating_sub(1))
        .collect();
    if !others.is_empty() {
        writeln!(out, "Also in this batch:")?;
        for album in others {
            writeln!(out, "  - {} [{}]", album.display_name(), album.album.score)?;
        }
    }

    Ok(PickOutcome::Picked(first))
}

fn print_album(out: &mut dyn Write, album: &EnrichedAlbum) -> Result<()> {
    writeln!(out, "{}", album.display_name())?;
    writeln!(
        out,
        "  score {} | {} | released {}",
        album.album.score, album.album.genre, album.album.date
    )?;
    if !album.external_url().is_empty() {
        writeln!(out, "  listen: {}", album.external_url())?;
    }
    if let Some(image) = album.image(ImageSize::Medium) {
        writeln!(out, "  cover: {}", image.url)?;
    }
    Ok(())
}

/// Existing entry for the identity, or a bare one to insert
async fn template_for(session: &ClientSession, identity: &AlbumIdentity) -> Result<HistoryEntry> {
    Ok(session
        .history
        .get(identity)
        .await?
        .unwrap_or_else(|| HistoryEntry::from_identity(identity)))
}

pub async fn set_logged(
    session: &ClientSession,
    identity: &AlbumIdentity,
    logged: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let template = template_for(session, identity).await?;
    session.history.update_log_status(&template, logged).await?;
    if logged {
        writeln!(out, "Logged {}", identity)?;
    } else {
        writeln!(out, "Unlogged {}", identity)?;
    }
    Ok(())
}

pub async fn set_liked(
    session: &ClientSession,
    identity: &AlbumIdentity,
    liked: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let template = template_for(session, identity).await?;
    session.history.update_like_status(&template, liked).await?;
    if liked {
        writeln!(out, "Liked {}", identity)?;
    } else {
        writeln!(out, "Unliked {}", identity)?;
    }
    Ok(())
}

pub async fn remove(
    session: &ClientSession,
    identity: &AlbumIdentity,
    out: &mut dyn Write,
) -> Result<()> {
    if session.history.remove(identity).await? {
        writeln!(out, "Removed {}", identity)?;
    } else {
        writeln!(out, "{} is not in history", identity)?;
    }
    Ok(())
}

pub async fn history(
    session: &ClientSession,
    filter: HistoryFilter,
    out: &mut dyn Write,
) -> Result<()> {
    let entries: Vec<_> = session
        .history
        .entries()
        .await?
        .into_iter()
        .filter(|e| !filter.logged_only || e.logged)
        .filter(|e| !filter.liked_only || e.liked)
        .collect();

    if entries.is_empty() {
        writeln!(out, "History is empty")?;
        return Ok(());
    }

    for entry in entries {
        let logged = if entry.logged { "L" } else { " " };
        let liked = if entry.liked { "*" } else { " " };
        write!(
            out,
            "[{}{}] {} by {}",
            logged, liked, entry.title, entry.artist
        )?;
        if let Some(date) = entry.log_date {
            write!(out, " (logged {})", date.format("%Y-%m-%d"))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Show the stored threshold, or store a new one
pub async fn rating(
    session: &ClientSession,
    value: Option<i64>,
    out: &mut dyn Write,
) -> Result<()> {
    match value {
        Some(value) => {
            if !is_valid_min_rating(value) {
                bail!(
                    "Minimum rating must be between {} and {}, got {}",
                    MIN_RATING_FLOOR,
                    MIN_RATING_CEILING,
                    value
                );
            }
            session.preferences.set_min_rating(value).await?;
            writeln!(out, "Minimum rating set to {}", value)?;
        }
        None => match session.preferences.get_min_rating().await? {
            Some(current) => writeln!(out, "Minimum rating: {}", current)?,
            None => writeln!(
                out,
                "Minimum rating: not set (default {})",
                DEFAULT_MIN_RATING
            )?,
        },
    }
    Ok(())
}

pub async fn spins(session: &ClientSession, out: &mut dyn Write) -> Result<()> {
    let count = session.spins.get().await?;
    writeln!(out, "Lifetime spins: {}", count)?;
    Ok(())
}

pub async fn export(session: &ClientSession, path: &Path, out: &mut dyn Write) -> Result<()> {
    let data = export_user_data(session.primary(), session.legacy()).await?;
    data.write_to(path).await?;
    writeln!(
        out,
        "Exported {} keys to {}",
        data.cookies.len() + data.local_storage.len(),
        path.display()
    )?;
    Ok(())
}

pub async fn import(session: &ClientSession, path: &Path, out: &mut dyn Write) -> Result<()> {
    let data = UserData::read_from(path).await?;
    if data.is_empty() {
        writeln!(out, "{} holds no data, nothing imported", path.display())?;
        return Ok(());
    }
    import_user_data(&data, session.primary(), session.legacy()).await?;
    writeln!(
        out,
        "Imported {} keys from {}",
        data.cookies.len() + data.local_storage.len(),
        path.display()
    )?;
    Ok(())
}

pub async fn reset(session: &ClientSession, confirmed: bool, out: &mut dyn Write) -> Result<()> {
    if !confirmed {
        bail!("Refusing to erase history and preferences without --yes");
    }
    reset_user_data(session.primary(), session.legacy()).await?;
    writeln!(out, "All local data cleared")?;
    Ok(())
}
