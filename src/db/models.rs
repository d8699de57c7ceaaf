use crate::content::ContentRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's bookmark for a content object, under a named key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bookmark {
    pub id: i64,
    pub content_type: String,
    pub object_id: i64,
    pub key: String,
    pub user_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Bookmark {
    pub fn target(&self) -> ContentRef {
        ContentRef::new(self.content_type.clone(), self.object_id)
    }
}
