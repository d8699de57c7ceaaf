use crate::error::BookmarksError;
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite};
use std::fmt;
use std::sync::LazyLock;

/// Polymorphic reference to a host-application entity: a dotted type tag
/// (`"app.model"`) plus the numeric primary key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentRef {
    pub content_type: String,
    pub object_id: i64,
}

impl ContentRef {
    pub fn new(content_type: impl Into<String>, object_id: i64) -> Self {
        Self {
            content_type: content_type.into(),
            object_id,
        }
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.content_type, self.object_id)
    }
}

/// Resolution of bookmark targets. The host application implements this for
/// every entity type it wants to make bookmarkable; the registry uses it to
/// check that a posted object id actually references something.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Dotted type tag, e.g. `"blog.article"`.
    fn content_type(&self) -> &str;

    /// Whether an entity with this id exists in the host's storage.
    async fn exists(&self, object_id: i64) -> Result<bool, BookmarksError>;
}

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("invalid identifier pattern"));

fn checked_identifier(name: &str) -> Result<&str, BookmarksError> {
    if IDENTIFIER.is_match(name) {
        Ok(name)
    } else {
        Err(BookmarksError::InvalidIdentifier(name.to_string()))
    }
}

/// Content source backed by an arbitrary table in the shared SQLite
/// database. Table and pk names are validated as plain identifiers since
/// they are interpolated into the query text.
#[derive(Debug)]
pub struct SqlContentSource {
    pool: Pool<Sqlite>,
    content_type: String,
    exists_sql: String,
}

impl SqlContentSource {
    pub fn new(
        pool: Pool<Sqlite>,
        content_type: impl Into<String>,
        table: &str,
        pk_column: &str,
    ) -> Result<Self, BookmarksError> {
        let table = checked_identifier(table)?;
        let pk_column = checked_identifier(pk_column)?;
        Ok(Self {
            pool,
            content_type: content_type.into(),
            exists_sql: format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE {pk_column} = ?)"),
        })
    }

    /// Parse a configuration entry of the form `content_type:table:pk`.
    pub fn from_spec(pool: Pool<Sqlite>, spec: &str) -> Result<Self, BookmarksError> {
        let mut parts = spec.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(ct), Some(table), Some(pk)) if !ct.is_empty() => {
                Self::new(pool, ct, table, pk)
            }
            _ => Err(BookmarksError::InvalidIdentifier(spec.to_string())),
        }
    }
}

#[async_trait]
impl ContentSource for SqlContentSource {
    fn content_type(&self) -> &str {
        &self.content_type
    }

    async fn exists(&self, object_id: i64) -> Result<bool, BookmarksError> {
        let found = sqlx::query_scalar::<_, bool>(&self.exists_sql)
            .bind(object_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_validated() {
        assert!(checked_identifier("articles").is_ok());
        assert!(checked_identifier("_private2").is_ok());
        assert!(checked_identifier("articles; DROP TABLE x").is_err());
        assert!(checked_identifier("").is_err());
        assert!(checked_identifier("1starts_with_digit").is_err());
    }
}
