//! Song record store
//!
//! Owns the canonical song set. Every operation returns
//! `songbook_common::Result` and leaves translation to the HTTP layer.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use songbook_common::db::{fold_case, NewSong, Song, SongDraft, SongPatch};
use songbook_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::pagination::{calculate_pagination, DEFAULT_LIMIT, DEFAULT_PAGE};

const SONG_COLUMNS: &str = "guid, title, artist, album, genre, created_at, updated_at";

/// Listing options as accepted on `GET /songs`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListOptions {
    pub genre: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// One page of matching songs
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongPage {
    pub songs: Vec<Song>,
    /// Matches across all pages
    pub total_songs: i64,
    pub total_pages: i64,
    pub current_page: i64,
}

/// A group key and the number of records in it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCount {
    pub key: String,
    pub count: i64,
}

impl GroupCount {
    pub fn new(key: impl Into<String>, count: i64) -> Self {
        Self {
            key: key.into(),
            count,
        }
    }
}

/// Group-by projections of the whole catalog, read from one snapshot
///
/// Every ranking is ordered by count descending, then key ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogGroups {
    pub total_songs: i64,
    pub per_genre: Vec<GroupCount>,
    pub per_artist: Vec<GroupCount>,
    pub per_album: Vec<GroupCount>,
    /// Distinct albums per artist
    pub albums_per_artist: Vec<GroupCount>,
}

/// Parse a song identifier taken from a URL
pub fn parse_song_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| Error::InvalidInput("Invalid ID format".to_string()))
}

/// Normalized listing filters; blank values are dropped
#[derive(Debug, Default)]
struct SongFilter {
    genre: Option<String>,
    artist: Option<String>,
    album: Option<String>,
    search: Option<String>,
}

impl SongFilter {
    fn from_options(options: &ListOptions) -> Self {
        fn needle(value: &Option<String>) -> Option<String> {
            value
                .as_deref()
                .map(|v| fold_case(v.trim()))
                .filter(|v| !v.is_empty())
        }

        Self {
            genre: needle(&options.genre),
            artist: needle(&options.artist),
            album: needle(&options.album),
            search: needle(&options.search),
        }
    }

    /// Append the WHERE clause; substring matches run against the folded
    /// columns so both sides go through `fold_case`
    fn push_where<'a>(&'a self, builder: &mut QueryBuilder<'a, Sqlite>) {
        builder.push(" WHERE 1 = 1");

        if let Some(genre) = &self.genre {
            builder.push(" AND genre = ").push_bind(genre.as_str());
        }
        if let Some(artist) = &self.artist {
            builder
                .push(" AND instr(artist_folded, ")
                .push_bind(artist.as_str())
                .push(") > 0");
        }
        if let Some(album) = &self.album {
            builder
                .push(" AND instr(album_folded, ")
                .push_bind(album.as_str())
                .push(") > 0");
        }
        if let Some(search) = &self.search {
            builder
                .push(" AND (instr(title_folded, ")
                .push_bind(search.as_str())
                .push(") > 0 OR instr(artist_folded, ")
                .push_bind(search.as_str())
                .push(") > 0 OR instr(album_folded, ")
                .push_bind(search.as_str())
                .push(") > 0)");
        }
    }
}

/// SQLite-backed song store
#[derive(Clone)]
pub struct SongStore {
    pool: SqlitePool,
}

impl SongStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Validate, normalize and insert a new song
    pub async fn create(&self, draft: SongDraft) -> Result<Song> {
        let fields = draft.validate()?;
        let now = Utc::now();
        let song = Song {
            id: Uuid::new_v4(),
            title: fields.title,
            artist: fields.artist,
            album: fields.album,
            genre: fields.genre,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO songs (
                guid, title, artist, album, genre,
                title_folded, artist_folded, album_folded,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(song.id.to_string())
        .bind(&song.title)
        .bind(&song.artist)
        .bind(&song.album)
        .bind(&song.genre)
        .bind(fold_case(&song.title))
        .bind(fold_case(&song.artist))
        .bind(fold_case(&song.album))
        .bind(song.created_at)
        .bind(song.updated_at)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        info!("Created song {} ({} - {})", song.id, song.artist, song.title);
        Ok(song)
    }

    /// Load one song by id
    pub async fn get(&self, id: Uuid) -> Result<Song> {
        let row = sqlx::query(&format!("SELECT {} FROM songs WHERE guid = ?", SONG_COLUMNS))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => song_from_row(&row),
            None => Err(song_not_found()),
        }
    }

    /// Replace the supplied fields of an existing song
    pub async fn update(&self, id: Uuid, patch: SongPatch) -> Result<Song> {
        let patch = patch.normalize()?;

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!("SELECT {} FROM songs WHERE guid = ?", SONG_COLUMNS))
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await?;
        let current = match row {
            Some(row) => song_from_row(&row)?,
            None => return Err(song_not_found()),
        };

        let NewSong {
            title,
            artist,
            album,
            genre,
        } = patch.apply_to(&current);
        let updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE songs
            SET title = ?, artist = ?, album = ?, genre = ?,
                title_folded = ?, artist_folded = ?, album_folded = ?,
                updated_at = ?
            WHERE guid = ?
            "#,
        )
        .bind(&title)
        .bind(&artist)
        .bind(&album)
        .bind(&genre)
        .bind(fold_case(&title))
        .bind(fold_case(&artist))
        .bind(fold_case(&album))
        .bind(updated_at)
        .bind(id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(storage_error)?;

        tx.commit().await?;

        debug!("Updated song {}", id);
        Ok(Song {
            id,
            title,
            artist,
            album,
            genre,
            created_at: current.created_at,
            updated_at,
        })
    }

    /// Remove a song and return what was removed
    pub async fn delete(&self, id: Uuid) -> Result<Song> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!("SELECT {} FROM songs WHERE guid = ?", SONG_COLUMNS))
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await?;
        let song = match row {
            Some(row) => song_from_row(&row)?,
            None => return Err(song_not_found()),
        };

        sqlx::query("DELETE FROM songs WHERE guid = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!("Deleted song {}", id);
        Ok(song)
    }

    /// Filtered, paginated listing, newest first
    pub async fn list(&self, options: &ListOptions) -> Result<SongPage> {
        let page = options.page.unwrap_or(DEFAULT_PAGE);
        let limit = options.limit.unwrap_or(DEFAULT_LIMIT);
        if page < 1 {
            return Err(Error::InvalidInput("page must be a positive integer".to_string()));
        }
        if limit < 1 {
            return Err(Error::InvalidInput("limit must be a positive integer".to_string()));
        }

        let filter = SongFilter::from_options(options);

        // Count and page come from the same snapshot
        let mut tx = self.pool.begin().await?;

        let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM songs");
        filter.push_where(&mut count_query);
        let total_songs: i64 = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&mut *tx)
            .await?;

        let p = calculate_pagination(total_songs, page, limit);

        let mut select = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM songs", SONG_COLUMNS));
        filter.push_where(&mut select);
        select
            .push(" ORDER BY created_at DESC, rowid DESC LIMIT ")
            .push_bind(p.limit)
            .push(" OFFSET ")
            .push_bind(p.offset);
        let rows = select.build().fetch_all(&mut *tx).await?;

        tx.commit().await?;

        let songs = rows.iter().map(song_from_row).collect::<Result<Vec<_>>>()?;

        Ok(SongPage {
            songs,
            total_songs,
            total_pages: p.total_pages,
            current_page: p.page,
        })
    }

    /// Read every group-by projection the statistics report needs
    ///
    /// All sub-queries share one read transaction, so the counts describe
    /// the same state of the catalog.
    pub async fn group_counts(&self) -> Result<CatalogGroups> {
        let mut tx = self.pool.begin().await?;

        let total_songs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM songs")
            .fetch_one(&mut *tx)
            .await?;

        let mut ranked = Vec::with_capacity(3);
        for column in ["genre", "artist", "album"] {
            let rows: Vec<(String, i64)> = sqlx::query_as(&format!(
                "SELECT {column} AS key, COUNT(*) AS count FROM songs
                 GROUP BY {column}
                 ORDER BY count DESC, key ASC"
            ))
            .fetch_all(&mut *tx)
            .await?;
            ranked.push(into_groups(rows));
        }

        let albums_per_artist: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT artist AS key, COUNT(*) AS count
            FROM (SELECT DISTINCT artist, album FROM songs)
            GROUP BY artist
            ORDER BY count DESC, key ASC
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let per_album = ranked.pop().unwrap_or_default();
        let per_artist = ranked.pop().unwrap_or_default();
        let per_genre = ranked.pop().unwrap_or_default();

        Ok(CatalogGroups {
            total_songs,
            per_genre,
            per_artist,
            per_album,
            albums_per_artist: into_groups(albums_per_artist),
        })
    }
}

fn into_groups(rows: Vec<(String, i64)>) -> Vec<GroupCount> {
    rows.into_iter()
        .map(|(key, count)| GroupCount { key, count })
        .collect()
}

fn song_not_found() -> Error {
    Error::NotFound("Song not found".to_string())
}

/// Map unique-key violations to `Conflict`, pass everything else through
fn storage_error(err: sqlx::Error) -> Error {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            Error::Conflict("Duplicate field value entered".to_string())
        }
        _ => Error::Database(err),
    }
}

fn song_from_row(row: &SqliteRow) -> Result<Song> {
    let guid: String = row.try_get("guid")?;
    let id = Uuid::parse_str(&guid)
        .map_err(|e| Error::Internal(format!("Stored song id {} is not a UUID: {}", guid, e)))?;

    Ok(Song {
        id,
        title: row.try_get("title")?,
        artist: row.try_get("artist")?,
        album: row.try_get("album")?,
        genre: row.try_get("genre")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
