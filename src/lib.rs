pub mod backend;
pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod middleware;
pub mod registry;
pub mod render;
pub mod router;
pub mod signals;

pub use backend::{Backend, BookmarkQuery, ModelBackend};
pub use content::{ContentRef, ContentSource, SqlContentSource};
pub use db::models::Bookmark;
pub use error::BookmarksError;
pub use forms::{BookmarkForm, ValidatedForm};
pub use handlers::{DefaultHandler, Handler, HandlerOptions};
pub use middleware::RequestContext;
pub use registry::Registry;
pub use router::{BookmarksState, bookmarks_router};
pub use signals::{BookmarkAction, Flow};
