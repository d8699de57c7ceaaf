use crate::backend::BookmarkQuery;
use crate::content::ContentRef;
use crate::db::models::Bookmark;
use crate::error::BookmarksError;
use crate::forms::BookmarkForm;
use crate::middleware::RequestContext;
use crate::registry::Registry;
use crate::signals::{BookmarkAction, BookmarkEvent, SavedEvent};
use axum::extract::{Form, FromRequest, Path, Query, Request, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

const ERROR_MODEL: &str = "Invalid model.";
const ERROR_HANDLER: &str = "Unregistered model.";
const ERROR_KEY: &str = "Invalid key.";
const ERROR_ABORTED: &str = "Receiver killed the bookmark process.";

#[derive(Clone)]
pub struct BookmarksState {
    pub registry: Arc<Registry>,
}

impl BookmarksState {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }
}

/// Router exposing the bookmark toggle endpoint and the two read-only
/// listings. Hosts nest this under whatever prefix they like.
pub fn bookmarks_router(state: BookmarksState) -> Router {
    Router::new()
        .route("/bookmark", any(bookmark))
        .route("/bookmarks", get(user_bookmarks))
        .route("/targets/{model}/{object_id}/bookmarks", get(target_bookmarks))
        .with_state(state)
}

/// The single mutating endpoint: validates the posted form, relays the
/// pre-save signal (any receiver can veto), toggles the bookmark, relays
/// the post-save signal and hands the response off to the handler.
async fn bookmark(
    State(state): State<BookmarksState>,
    mut ctx: RequestContext,
    req: Request,
) -> Response {
    if req.method() != Method::POST {
        return (StatusCode::FORBIDDEN, "Forbidden.").into_response();
    }

    let Form(form) = match Form::<BookmarkForm>::from_request(req, &()).await {
        Ok(form) => form,
        Err(rejection) => {
            debug!(error = %rejection, "unparseable bookmark form body");
            return (StatusCode::BAD_REQUEST, "Invalid data in bookmark form.").into_response();
        }
    };
    ctx.next = form.next.clone();

    let registry = &state.registry;

    // model and handler resolution
    let Some(model) = form.model.as_deref() else {
        return (StatusCode::BAD_REQUEST, ERROR_MODEL).into_response();
    };
    if registry.get_source(model).is_none() {
        return (StatusCode::BAD_REQUEST, ERROR_MODEL).into_response();
    }
    let Some(handler) = registry.get_handler(model) else {
        return (StatusCode::BAD_REQUEST, ERROR_HANDLER).into_response();
    };

    let mut validated = match form.validate(&ctx, registry).await {
        Ok(validated) => validated,
        Err(errors) => return handler.fail(&ctx, &errors),
    };

    // the handler has the final say on the key
    let key = handler.get_key(&ctx, &validated.target, Some(&validated.key));
    if !handler.allow_key(&ctx, &validated.target, &key) {
        return (StatusCode::BAD_REQUEST, ERROR_KEY).into_response();
    }
    validated.key = key;

    let exists = match validated.exists(registry.backend()).await {
        Ok(exists) => exists,
        Err(e) => return e.into_response(),
    };
    let action = if exists {
        BookmarkAction::Remove
    } else {
        BookmarkAction::Add
    };

    let event = BookmarkEvent {
        action,
        user_id: validated.user_id,
        target: &validated.target,
        key: &validated.key,
    };
    if registry.dispatch_pre_save(&ctx, &event).aborted() {
        return (StatusCode::BAD_REQUEST, ERROR_ABORTED).into_response();
    }

    let (bookmark, created) = match validated.save(registry.backend()).await {
        Ok(saved) => saved,
        Err(e) => return e.into_response(),
    };

    registry.dispatch_post_save(
        &ctx,
        &SavedEvent {
            bookmark: &bookmark,
            created,
        },
    );

    handler.response(&ctx, &bookmark, created)
}

#[derive(Debug, Default, Deserialize)]
struct ListParams {
    key: Option<String>,
    reversed: Option<bool>,
}

impl ListParams {
    fn into_query(self) -> BookmarkQuery {
        BookmarkQuery {
            key: self.key,
            user_id: None,
            reversed: self.reversed.unwrap_or(false),
        }
    }
}

/// Bookmarks of the requesting user, in creation order.
async fn user_bookmarks(
    State(state): State<BookmarksState>,
    ctx: RequestContext,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Bookmark>>, BookmarksError> {
    let Some(user_id) = ctx.user_id else {
        return Err(BookmarksError::NotAuthenticated);
    };
    let bookmarks = state
        .registry
        .backend()
        .filter_by(user_id, &params.into_query())
        .await?;
    Ok(Json(bookmarks))
}

/// Bookmarks referencing one target, in creation order.
async fn target_bookmarks(
    State(state): State<BookmarksState>,
    Path((model, object_id)): Path<(String, i64)>,
    Query(params): Query<ListParams>,
) -> Response {
    if state.registry.get_source(&model).is_none() {
        return (StatusCode::BAD_REQUEST, ERROR_MODEL).into_response();
    }
    let target = ContentRef::new(model, object_id);
    match state
        .registry
        .backend()
        .filter_for(&target, &params.into_query())
        .await
    {
        Ok(bookmarks) => Json(bookmarks).into_response(),
        Err(e) => e.into_response(),
    }
}
