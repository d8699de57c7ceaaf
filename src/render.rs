//! Template helpers: fetch a bookmark, or build a ready-to-render
//! add/remove form, for a target and the current user. Both return `None`
//! in the situations where a template would simply render nothing (the
//! user is anonymous, the target is not bookmarkable, the key is not
//! allowed).

use crate::content::ContentRef;
use crate::db::models::Bookmark;
use crate::error::BookmarksError;
use crate::middleware::RequestContext;
use crate::registry::Registry;
use std::fmt;

/// Equivalent of `{% bookmark for target using key as var %}`.
pub async fn bookmark_for(
    registry: &Registry,
    ctx: &RequestContext,
    target: &ContentRef,
    key: Option<&str>,
) -> Result<Option<Bookmark>, BookmarksError> {
    let Some(user_id) = ctx.user_id else {
        return Ok(None);
    };
    let Some(handler) = registry.get_handler(&target.content_type) else {
        return Ok(None);
    };
    let key = handler.get_key(ctx, target, key);
    match registry.backend().get(user_id, target, &key).await {
        Ok(bookmark) => Ok(Some(bookmark)),
        Err(BookmarksError::DoesNotExist) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Equivalent of `{% bookmark_form for target using key as var %}`.
/// `action` is the URL the rendered form posts to (wherever the host
/// mounted the bookmark endpoint).
pub async fn bookmark_form_for(
    registry: &Registry,
    ctx: &RequestContext,
    target: &ContentRef,
    key: Option<&str>,
    action: &str,
) -> Result<Option<FormSnippet>, BookmarksError> {
    let Some(user_id) = ctx.user_id else {
        return Ok(None);
    };
    let Some(handler) = registry.get_handler(&target.content_type) else {
        return Ok(None);
    };
    let key = handler.get_key(ctx, target, key);
    if !handler.allow_key(ctx, target, &key) {
        return Ok(None);
    }
    let exists = registry.backend().exists(user_id, target, &key).await?;
    Ok(Some(FormSnippet {
        action: action.to_string(),
        target: target.clone(),
        key,
        exists,
    }))
}

/// A renderable add/remove bookmark form. The submit label reflects the
/// toggle the POST will perform.
#[derive(Debug, Clone)]
pub struct FormSnippet {
    pub action: String,
    pub target: ContentRef,
    pub key: String,
    pub exists: bool,
}

impl fmt::Display for FormSnippet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = if self.exists {
            "Remove bookmark"
        } else {
            "Add bookmark"
        };
        write!(
            f,
            concat!(
                "<form method=\"post\" action=\"{action}\">",
                "<input type=\"hidden\" name=\"model\" value=\"{model}\">",
                "<input type=\"hidden\" name=\"object_id\" value=\"{object_id}\">",
                "<input type=\"hidden\" name=\"key\" value=\"{key}\">",
                "<button type=\"submit\">{label}</button>",
                "</form>"
            ),
            action = escape_attr(&self.action),
            model = escape_attr(&self.target.content_type),
            object_id = self.target.object_id,
            key = escape_attr(&self.key),
            label = label,
        )
    }
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
