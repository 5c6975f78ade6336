//! Database access layer for songbook-api

pub mod songs;

pub use songs::{
    parse_song_id, CatalogGroups, GroupCount, ListOptions, SongPage, SongStore,
};
