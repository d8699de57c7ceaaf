use crate::content::ContentRef;
use crate::db::models::Bookmark;
use crate::db::schema::SQLITE_INIT;
use crate::error::BookmarksError;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

pub type SqlitePool = Pool<Sqlite>;

const COLUMNS: &str = r#"id, content_type, object_id, "key", user_id, created_at, modified_at"#;

#[derive(Clone)]
pub struct BookmarkStore {
    pool: SqlitePool,
}

impl BookmarkStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), BookmarksError> {
        // execute multiple statements safely (SQLite supports multi-commands but sqlx::query doesn't)
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Insert a new bookmark row. The UNIQUE constraint is what actually
    /// guards against duplicates; a violation surfaces as `AlreadyExists`.
    pub async fn insert(
        &self,
        user_id: Option<i64>,
        target: &ContentRef,
        key: &str,
    ) -> Result<Bookmark, BookmarksError> {
        let now = Utc::now().to_rfc3339();
        let res = sqlx::query(
            r#"INSERT INTO bookmarks (content_type, object_id, "key", user_id, created_at, modified_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&target.content_type)
        .bind(target.object_id)
        .bind(key)
        .bind(user_id)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(BookmarksError::from_insert)?;

        self.select_by_id(res.last_insert_rowid()).await
    }

    pub async fn select_by_id(&self, id: i64) -> Result<Bookmark, BookmarksError> {
        let sql = format!("SELECT {COLUMNS} FROM bookmarks WHERE id = ?");
        let row = sqlx::query(&sql).bind(id).fetch_one(&self.pool).await?;
        Self::row_to_model(row)
    }

    pub async fn select_one(
        &self,
        user_id: i64,
        target: &ContentRef,
        key: &str,
    ) -> Result<Option<Bookmark>, BookmarksError> {
        let sql = format!(
            r#"SELECT {COLUMNS} FROM bookmarks
               WHERE content_type = ? AND object_id = ? AND "key" = ? AND user_id = ?"#
        );
        let row = sqlx::query(&sql)
            .bind(&target.content_type)
            .bind(target.object_id)
            .bind(key)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_model).transpose()
    }

    /// Delete one bookmark and return the removed (now detached) row.
    pub async fn delete(
        &self,
        user_id: i64,
        target: &ContentRef,
        key: &str,
    ) -> Result<Bookmark, BookmarksError> {
        let Some(bookmark) = self.select_one(user_id, target, key).await? else {
            return Err(BookmarksError::DoesNotExist);
        };
        sqlx::query("DELETE FROM bookmarks WHERE id = ?")
            .bind(bookmark.id)
            .execute(&self.pool)
            .await?;
        Ok(bookmark)
    }

    /// Delete every bookmark referencing the target, returning the count.
    pub async fn delete_all_for(&self, target: &ContentRef) -> Result<u64, BookmarksError> {
        let res = sqlx::query("DELETE FROM bookmarks WHERE content_type = ? AND object_id = ?")
            .bind(&target.content_type)
            .bind(target.object_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    pub async fn exists(
        &self,
        user_id: i64,
        target: &ContentRef,
        key: &str,
    ) -> Result<bool, BookmarksError> {
        let found = sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS(
                 SELECT 1 FROM bookmarks
                 WHERE content_type = ? AND object_id = ? AND "key" = ? AND user_id = ?
               )"#,
        )
        .bind(&target.content_type)
        .bind(target.object_id)
        .bind(key)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(found)
    }

    /// Bookmarks added by a user, in creation order (descending when
    /// `reversed`), optionally narrowed to one key.
    pub async fn select_by(
        &self,
        user_id: i64,
        key: Option<&str>,
        reversed: bool,
    ) -> Result<Vec<Bookmark>, BookmarksError> {
        let mut sql = format!("SELECT {COLUMNS} FROM bookmarks WHERE user_id = ?");
        if key.is_some() {
            sql.push_str(r#" AND "key" = ?"#);
        }
        sql.push_str(Self::order_clause(reversed));

        let mut query = sqlx::query(&sql).bind(user_id);
        if let Some(k) = key {
            query = query.bind(k);
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_model).collect()
    }

    /// Bookmarks referencing a target, in creation order, optionally
    /// narrowed to one user and/or key.
    pub async fn select_for(
        &self,
        target: &ContentRef,
        user_id: Option<i64>,
        key: Option<&str>,
        reversed: bool,
    ) -> Result<Vec<Bookmark>, BookmarksError> {
        let mut sql = format!("SELECT {COLUMNS} FROM bookmarks WHERE content_type = ? AND object_id = ?");
        if user_id.is_some() {
            sql.push_str(" AND user_id = ?");
        }
        if key.is_some() {
            sql.push_str(r#" AND "key" = ?"#);
        }
        sql.push_str(Self::order_clause(reversed));

        let mut query = sqlx::query(&sql)
            .bind(&target.content_type)
            .bind(target.object_id);
        if let Some(u) = user_id {
            query = query.bind(u);
        }
        if let Some(k) = key {
            query = query.bind(k);
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_model).collect()
    }

    fn order_clause(reversed: bool) -> &'static str {
        // id breaks ties between rows created in the same instant
        if reversed {
            " ORDER BY created_at DESC, id DESC"
        } else {
            " ORDER BY created_at ASC, id ASC"
        }
    }

    fn row_to_model(row: SqliteRow) -> Result<Bookmark, BookmarksError> {
        let id: i64 = row.try_get("id")?;
        let content_type: String = row.try_get("content_type")?;
        let object_id: i64 = row.try_get("object_id")?;
        let key: String = row.try_get("key")?;
        let user_id: Option<i64> = row.try_get("user_id")?;
        let created_str: String = row.try_get("created_at")?;
        let modified_str: String = row.try_get("modified_at")?;

        let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&created_str)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?
            .with_timezone(&Utc);
        let modified_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&modified_str)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?
            .with_timezone(&Utc);

        Ok(Bookmark {
            id,
            content_type,
            object_id,
            key,
            user_id,
            created_at,
            modified_at,
        })
    }
}
