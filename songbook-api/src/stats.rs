//! Catalog statistics
//!
//! The report is recomputed from scratch on every request. The store supplies
//! group-by projections read from a single snapshot; everything derived from
//! them (leaders, distribution) is computed here without touching storage.
//!
//! Rankings are ordered by count descending. Equal counts fall back to the
//! group key in ascending byte order, so repeated requests over the same data
//! always render identically.

use serde::ser::{Serialize, SerializeMap, Serializer};
use songbook_common::Result;
use tracing::debug;

use crate::db::{CatalogGroups, GroupCount, SongStore};

/// Key/value pairs that serialize as a JSON object in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedMap<V>(Vec<(String, V)>);

impl<V> OrderedMap<V> {
    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.0.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V> FromIterator<(String, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        OrderedMap(iter.into_iter().collect())
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Group key → record count, highest count first
pub type Ranking = OrderedMap<i64>;

impl From<Vec<GroupCount>> for Ranking {
    fn from(groups: Vec<GroupCount>) -> Self {
        groups.into_iter().map(|g| (g.key, g.count)).collect()
    }
}

/// Catalog-wide counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct Totals {
    pub songs: i64,
    pub artists: i64,
    pub albums: i64,
    pub genres: i64,
}

/// Artist with the most songs
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TopArtist {
    pub name: String,
    pub songs: i64,
}

/// Derived statistics over the whole catalog
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsReport {
    pub totals: Totals,
    pub songs_per_genre: Ranking,
    pub songs_per_artist: Ranking,
    pub songs_per_album: Ranking,
    /// Distinct albums per artist, not song volume
    pub albums_per_artist: Ranking,
    pub most_common_genre: Option<String>,
    pub least_common_genre: Option<String>,
    pub top_artist: Option<TopArtist>,
    /// Genre → share of all songs, e.g. `"66.67%"`
    pub genre_distribution: OrderedMap<String>,
}

impl StatisticsReport {
    /// Derive the full report from one set of group-by projections
    pub fn from_groups(groups: CatalogGroups) -> Self {
        let CatalogGroups {
            total_songs,
            per_genre,
            per_artist,
            per_album,
            albums_per_artist,
        } = groups;

        let totals = Totals {
            songs: total_songs,
            artists: per_artist.len() as i64,
            albums: per_album.len() as i64,
            genres: per_genre.len() as i64,
        };

        let most_common_genre = per_genre.first().map(|g| g.key.clone());
        let least_common_genre = per_genre.last().map(|g| g.key.clone());
        let top_artist = per_artist.first().map(|g| TopArtist {
            name: g.key.clone(),
            songs: g.count,
        });

        let genre_distribution = if total_songs > 0 {
            per_genre
                .iter()
                .map(|g| (g.key.clone(), format_percentage(g.count, total_songs)))
                .collect()
        } else {
            OrderedMap::default()
        };

        Self {
            totals,
            songs_per_genre: per_genre.into(),
            songs_per_artist: per_artist.into(),
            songs_per_album: per_album.into(),
            albums_per_artist: albums_per_artist.into(),
            most_common_genre,
            least_common_genre,
            top_artist,
            genre_distribution,
        }
    }
}

/// Build the statistics report from the current catalog
///
/// Storage errors are returned as-is.
pub async fn collect_statistics(store: &SongStore) -> Result<StatisticsReport> {
    let groups = store.group_counts().await?;
    debug!(
        "Aggregating statistics over {} songs in {} genres",
        groups.total_songs,
        groups.per_genre.len()
    );
    Ok(StatisticsReport::from_groups(groups))
}

/// `count / total` as a percentage with two decimals, rounded half up
///
/// Works in whole hundredths of a percent so the result never depends on
/// binary floating point. `total` must be positive.
pub fn format_percentage(count: i64, total: i64) -> String {
    let count = count as i128;
    let total = total as i128;
    let hundredths = (count * 20_000 + total) / (total * 2);
    format!("{}.{:02}%", hundredths / 100, hundredths % 100)
}
