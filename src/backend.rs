use crate::content::ContentRef;
use crate::db::models::Bookmark;
use crate::db::sqlite::BookmarkStore;
use crate::error::BookmarksError;
use async_trait::async_trait;

/// Optional narrowing for the filter operations.
#[derive(Debug, Clone, Default)]
pub struct BookmarkQuery {
    pub key: Option<String>,
    /// Only meaningful for `filter_for`; `filter_by` already fixes the user.
    pub user_id: Option<i64>,
    /// Descending creation order instead of ascending.
    pub reversed: bool,
}

impl BookmarkQuery {
    pub fn reversed() -> Self {
        Self {
            reversed: true,
            ..Self::default()
        }
    }

    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::default()
        }
    }
}

/// Strategy object translating (user, target, key) operations into storage
/// queries. Holds no state and enforces no invariants beyond forwarding;
/// uniqueness is the storage layer's job.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Create a bookmark. `AlreadyExists` if the triple already exists.
    async fn add(
        &self,
        user_id: i64,
        target: &ContentRef,
        key: &str,
    ) -> Result<Bookmark, BookmarksError>;

    /// Delete a bookmark and return the removed row. `DoesNotExist` if absent.
    async fn remove(
        &self,
        user_id: i64,
        target: &ContentRef,
        key: &str,
    ) -> Result<Bookmark, BookmarksError>;

    /// Delete all bookmarks referencing the target (cascade-delete path).
    async fn remove_all_for(&self, target: &ContentRef) -> Result<u64, BookmarksError>;

    /// Bookmarks added by a user, ordered by creation time.
    async fn filter_by(
        &self,
        user_id: i64,
        query: &BookmarkQuery,
    ) -> Result<Vec<Bookmark>, BookmarksError>;

    /// Bookmarks referencing a target, ordered by creation time.
    async fn filter_for(
        &self,
        target: &ContentRef,
        query: &BookmarkQuery,
    ) -> Result<Vec<Bookmark>, BookmarksError>;

    async fn exists(
        &self,
        user_id: i64,
        target: &ContentRef,
        key: &str,
    ) -> Result<bool, BookmarksError>;

    /// Fetch one bookmark. `DoesNotExist` if absent.
    async fn get(
        &self,
        user_id: i64,
        target: &ContentRef,
        key: &str,
    ) -> Result<Bookmark, BookmarksError>;
}

/// The shipped SQLite-backed implementation.
pub struct ModelBackend {
    store: BookmarkStore,
}

impl ModelBackend {
    pub fn new(store: BookmarkStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &BookmarkStore {
        &self.store
    }
}

#[async_trait]
impl Backend for ModelBackend {
    async fn add(
        &self,
        user_id: i64,
        target: &ContentRef,
        key: &str,
    ) -> Result<Bookmark, BookmarksError> {
        self.store.insert(Some(user_id), target, key).await
    }

    async fn remove(
        &self,
        user_id: i64,
        target: &ContentRef,
        key: &str,
    ) -> Result<Bookmark, BookmarksError> {
        self.store.delete(user_id, target, key).await
    }

    async fn remove_all_for(&self, target: &ContentRef) -> Result<u64, BookmarksError> {
        self.store.delete_all_for(target).await
    }

    async fn filter_by(
        &self,
        user_id: i64,
        query: &BookmarkQuery,
    ) -> Result<Vec<Bookmark>, BookmarksError> {
        self.store
            .select_by(user_id, query.key.as_deref(), query.reversed)
            .await
    }

    async fn filter_for(
        &self,
        target: &ContentRef,
        query: &BookmarkQuery,
    ) -> Result<Vec<Bookmark>, BookmarksError> {
        self.store
            .select_for(target, query.user_id, query.key.as_deref(), query.reversed)
            .await
    }

    async fn exists(
        &self,
        user_id: i64,
        target: &ContentRef,
        key: &str,
    ) -> Result<bool, BookmarksError> {
        self.store.exists(user_id, target, key).await
    }

    async fn get(
        &self,
        user_id: i64,
        target: &ContentRef,
        key: &str,
    ) -> Result<Bookmark, BookmarksError> {
        self.store
            .select_one(user_id, target, key)
            .await?
            .ok_or(BookmarksError::DoesNotExist)
    }
}
