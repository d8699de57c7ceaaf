#![allow(dead_code)]

use async_trait::async_trait;
use bookmarkd::backend::{Backend, ModelBackend};
use bookmarkd::content::ContentSource;
use bookmarkd::db::BookmarkStore;
use bookmarkd::error::BookmarksError;
use bookmarkd::registry::Registry;
use sqlx::sqlite::SqlitePoolOptions;
use std::collections::HashSet;
use std::sync::Arc;

pub async fn memory_store() -> BookmarkStore {
    // one connection: every connection to sqlite::memory: is its own db
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory database");
    let store = BookmarkStore::new(pool);
    store.init_schema().await.expect("schema init failed");
    store
}

pub async fn memory_backend() -> Arc<dyn Backend> {
    Arc::new(ModelBackend::new(memory_store().await))
}

/// Content source resolving against a fixed set of ids; stands in for a
/// host application's table.
pub struct FixedContentSource {
    content_type: String,
    ids: HashSet<i64>,
}

impl FixedContentSource {
    pub fn new(content_type: &str, ids: &[i64]) -> Arc<dyn ContentSource> {
        Arc::new(Self {
            content_type: content_type.to_string(),
            ids: ids.iter().copied().collect(),
        })
    }
}

#[async_trait]
impl ContentSource for FixedContentSource {
    fn content_type(&self) -> &str {
        &self.content_type
    }

    async fn exists(&self, object_id: i64) -> Result<bool, BookmarksError> {
        Ok(self.ids.contains(&object_id))
    }
}

/// Fresh registry over an in-memory backend with one registered content
/// type resolving the given ids.
pub async fn registry_with(content_type: &str, ids: &[i64]) -> Arc<Registry> {
    let registry = Arc::new(Registry::new(memory_backend().await));
    registry
        .register_default(FixedContentSource::new(content_type, ids))
        .expect("register failed");
    registry
}
