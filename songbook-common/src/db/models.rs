//! Song record models
//!
//! Write-time normalization lives here so every path into the store applies
//! the same rules: business fields are trimmed and must be non-empty, and
//! `genre` is lowercased.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored song record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: Uuid,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub genre: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create request as received from a client; any field may be missing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SongDraft {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
}

/// Normalized fields ready for insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSong {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub genre: String,
}

impl SongDraft {
    /// Trim every field and lowercase the genre
    ///
    /// Fails with `InvalidInput` if any field is missing or blank.
    pub fn validate(self) -> Result<NewSong> {
        match (
            clean(self.title),
            clean(self.artist),
            clean(self.album),
            clean(self.genre),
        ) {
            (Some(title), Some(artist), Some(album), Some(genre)) => Ok(NewSong {
                title,
                artist,
                album,
                genre: fold_case(&genre),
            }),
            _ => Err(Error::InvalidInput(
                "All fields are required: title, artist, album, genre".to_string(),
            )),
        }
    }
}

/// Partial update; only supplied fields are replaced
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SongPatch {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
}

impl SongPatch {
    /// Trim supplied fields and lowercase a supplied genre
    ///
    /// A supplied field that is blank after trimming is an error rather than
    /// a silent no-op.
    pub fn normalize(self) -> Result<SongPatch> {
        Ok(SongPatch {
            title: supplied("title", self.title)?,
            artist: supplied("artist", self.artist)?,
            album: supplied("album", self.album)?,
            genre: supplied("genre", self.genre)?.map(|genre| fold_case(&genre)),
        })
    }

    /// Apply the patch on top of an existing record's fields
    pub fn apply_to(&self, song: &Song) -> NewSong {
        NewSong {
            title: self.title.clone().unwrap_or_else(|| song.title.clone()),
            artist: self.artist.clone().unwrap_or_else(|| song.artist.clone()),
            album: self.album.clone().unwrap_or_else(|| song.album.clone()),
            genre: self.genre.clone().unwrap_or_else(|| song.genre.clone()),
        }
    }
}

/// Case-folded form used for case-insensitive substring matching
///
/// Stored alongside each searchable field and applied to filter values, so
/// both sides of a comparison fold identically (full Unicode, not just ASCII).
pub fn fold_case(value: &str) -> String {
    value.to_lowercase()
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn supplied(field: &str, value: Option<String>) -> Result<Option<String>> {
    match value {
        None => Ok(None),
        Some(v) => match clean(Some(v)) {
            Some(trimmed) => Ok(Some(trimmed)),
            None => Err(Error::InvalidInput(format!("{} cannot be empty", field))),
        },
    }
}
