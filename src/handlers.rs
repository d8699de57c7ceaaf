use crate::config::CONFIG;
use crate::content::ContentRef;
use crate::db::models::Bookmark;
use crate::forms::FormErrors;
use crate::middleware::RequestContext;
use crate::signals::{BookmarkEvent, Flow};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde_json::json;

/// Per-model bookmarking options. Defaults come from the configuration so
/// uncustomized handlers can still be tuned through the environment.
#[derive(Debug, Clone)]
pub struct HandlerOptions {
    /// Key used when the client does not provide one.
    pub default_key: String,
    /// Querystring parameter that may carry the post-save redirect URL.
    pub next_querystring_key: String,
    /// Set to false to disable bookmark deletion for this model.
    pub can_remove_bookmarks: bool,
}

impl Default for HandlerOptions {
    fn default() -> Self {
        let cfg = &*CONFIG;
        Self {
            default_key: cfg.default_key.clone(),
            next_querystring_key: cfg.next_querystring_key.clone(),
            can_remove_bookmarks: cfg.can_remove_bookmarks,
        }
    }
}

/// Per-target-model bookmarking policy.
///
/// The default methods cover the common case; implementors usually only
/// provide `options()` and override the occasional hook. Pre hooks return
/// `Flow::Abort` to kill the operation; the registry always invokes them
/// through its signal relay, together with any connected receivers.
pub trait Handler: Send + Sync {
    fn options(&self) -> &HandlerOptions;

    /// The key to use when the client provided none (or to normalize the
    /// provided one). Called with `None` by the template helpers.
    fn get_key(
        &self,
        _ctx: &RequestContext,
        _target: &ContentRef,
        provided: Option<&str>,
    ) -> String {
        match provided {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => self.options().default_key.clone(),
        }
    }

    /// Authorization gate for a key. By default only the computed default
    /// key is allowed; override to support multiple named bookmark
    /// categories per target.
    fn allow_key(&self, ctx: &RequestContext, target: &ContentRef, key: &str) -> bool {
        key == self.get_key(ctx, target, None)
    }

    fn pre_add(&self, ctx: &RequestContext, _event: &BookmarkEvent) -> Flow {
        if ctx.is_authenticated() {
            Flow::Proceed
        } else {
            Flow::Abort
        }
    }

    fn post_add(&self, _ctx: &RequestContext, _bookmark: &Bookmark) {}

    fn pre_remove(&self, ctx: &RequestContext, _event: &BookmarkEvent) -> Flow {
        if ctx.is_authenticated() && self.options().can_remove_bookmarks {
            Flow::Proceed
        } else {
            Flow::Abort
        }
    }

    fn post_remove(&self, _ctx: &RequestContext, _bookmark: &Bookmark) {}

    /// Success response: JSON for AJAX requests, a redirect otherwise.
    fn response(&self, ctx: &RequestContext, bookmark: &Bookmark, _created: bool) -> Response {
        if ctx.is_ajax {
            Json(json!({
                "key": bookmark.key,
                "bookmark_id": bookmark.id,
                "user_id": bookmark.user_id,
            }))
            .into_response()
        } else {
            let next = ctx.next_url(&self.options().next_querystring_key);
            Redirect::to(&next).into_response()
        }
    }

    /// Failure response when the bookmark form did not validate.
    fn fail(&self, _ctx: &RequestContext, _errors: &FormErrors) -> Response {
        (StatusCode::BAD_REQUEST, "Invalid data in bookmark form.").into_response()
    }
}

/// Handler with no custom behavior, driven entirely by its options.
#[derive(Debug, Clone, Default)]
pub struct DefaultHandler {
    options: HandlerOptions,
}

impl DefaultHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: HandlerOptions) -> Self {
        Self { options }
    }
}

impl Handler for DefaultHandler {
    fn options(&self) -> &HandlerOptions {
        &self.options
    }
}
