//! SQL DDL for initializing the bookmark storage.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema with:
/// - `id` INTEGER PRIMARY KEY AUTOINCREMENT
/// - the polymorphic target reference as (`content_type`, `object_id`)
/// - `user_id` nullable: the schema allows anonymous bookmarks even
///   though every request flow requires authentication
/// - timestamps stored as RFC3339 text, maintained by the storage layer
/// - the single correctness invariant of the whole system: at most one
///   bookmark per (target, key, user), enforced here and not in
///   application code
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS bookmarks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    content_type TEXT NOT NULL,
    object_id INTEGER NOT NULL,
    "key" TEXT NOT NULL,
    user_id INTEGER NULL,
    created_at TEXT NOT NULL, -- RFC3339
    modified_at TEXT NOT NULL, -- RFC3339
    UNIQUE (content_type, object_id, "key", user_id)
);

CREATE INDEX IF NOT EXISTS idx_bookmarks_user ON bookmarks(user_id);
CREATE INDEX IF NOT EXISTS idx_bookmarks_target ON bookmarks(content_type, object_id);
"#;
