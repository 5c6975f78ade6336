//! Database initialization
//!
//! Opens (or creates) the SQLite catalog and brings the schema up to date.
//! Every statement is idempotent, so this runs on every startup.

use crate::db::models::fold_case;
use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Busy timeout applied to every pooled connection
const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Searchable columns, each paired with a `<column>_folded` copy
const FOLDED_COLUMNS: [&str; 3] = ["title", "artist", "album"];

/// Initialize database connection and create tables if needed
pub async fn init_database(database_url: &str) -> Result<SqlitePool> {
    let in_memory = is_memory_url(database_url);

    let mut options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT);

    // WAL has no meaning for an in-memory database
    if !in_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    // Each connection to `:memory:` is a separate database, so keep exactly one
    let pool = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(10)
            .min_connections(1)
            .connect_with(options)
            .await?
    };

    info!("Opened database: {}", database_url);

    create_songs_table(&pool).await?;
    add_folded_columns(&pool).await?;
    backfill_folded_columns(&pool).await?;

    Ok(pool)
}

/// Single-connection in-memory catalog, used by tests and throwaway runs
pub async fn init_memory_database() -> Result<SqlitePool> {
    init_database("sqlite::memory:").await
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// Create the songs table and its lookup indexes
///
/// Business fields are stored trimmed; the CHECK constraints keep blank
/// values out even if a caller bypasses model validation. The `*_folded`
/// columns hold `fold_case` copies for substring filters, since SQLite's own
/// `lower()` only folds ASCII.
pub async fn create_songs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS songs (
            guid TEXT PRIMARY KEY,
            title TEXT NOT NULL CHECK (length(trim(title)) > 0),
            artist TEXT NOT NULL CHECK (length(trim(artist)) > 0),
            album TEXT NOT NULL CHECK (length(trim(album)) > 0),
            genre TEXT NOT NULL CHECK (length(trim(genre)) > 0),
            title_folded TEXT NOT NULL DEFAULT '',
            artist_folded TEXT NOT NULL DEFAULT '',
            album_folded TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    for (name, column) in [
        ("idx_songs_genre", "genre"),
        ("idx_songs_artist", "artist"),
        ("idx_songs_album", "album"),
        ("idx_songs_created_at", "created_at"),
    ] {
        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS {} ON songs({})",
            name, column
        ))
        .execute(pool)
        .await?;
    }

    Ok(())
}

/// Add `*_folded` columns to a catalog created before they existed
///
/// Idempotent: columns already present are skipped.
async fn add_folded_columns(pool: &SqlitePool) -> Result<()> {
    for column in FOLDED_COLUMNS {
        let has_column: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM pragma_table_info('songs') WHERE name = ?",
        )
        .bind(format!("{}_folded", column))
        .fetch_one(pool)
        .await?;

        if has_column == 0 {
            sqlx::query(&format!(
                "ALTER TABLE songs ADD COLUMN {}_folded TEXT NOT NULL DEFAULT ''",
                column
            ))
            .execute(pool)
            .await?;
            info!("Added {}_folded column to songs table", column);
        }
    }

    Ok(())
}

/// Fill folded copies for rows written without them
///
/// Stored business fields are never blank, so an empty folded value always
/// means "not yet computed".
async fn backfill_folded_columns(pool: &SqlitePool) -> Result<()> {
    let rows: Vec<(String, String, String, String)> = sqlx::query_as(
        "SELECT guid, title, artist, album FROM songs
         WHERE title_folded = '' OR artist_folded = '' OR album_folded = ''",
    )
    .fetch_all(pool)
    .await?;

    if rows.is_empty() {
        return Ok(());
    }

    let mut tx = pool.begin().await?;
    for (guid, title, artist, album) in &rows {
        sqlx::query(
            "UPDATE songs SET title_folded = ?, artist_folded = ?, album_folded = ?
             WHERE guid = ?",
        )
        .bind(fold_case(title))
        .bind(fold_case(artist))
        .bind(fold_case(album))
        .bind(guid)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    info!("Backfilled folded search columns for {} songs", rows.len());
    Ok(())
}
