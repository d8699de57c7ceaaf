//! Database module: models and schema for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows and conversions
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)

use crate::error::BookmarksError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::Bookmark;
pub use schema::SQLITE_INIT;
pub use sqlite::{BookmarkStore, SqlitePool};

/// Open (creating if missing) the SQLite database behind the given URL.
pub async fn connect(database_url: &str) -> Result<SqlitePool, BookmarksError> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    Ok(pool)
}
