use crate::backend::Backend;
use crate::content::{ContentRef, ContentSource};
use crate::error::BookmarksError;
use crate::handlers::{DefaultHandler, Handler};
use crate::middleware::RequestContext;
use crate::signals::{BookmarkAction, BookmarkEvent, Flow, SavedEvent, SignalHub};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// Maps content types to bookmarking policy.
///
/// The registry is explicitly constructed and passed around (usually as an
/// `Arc<Registry>` inside the router state); registration is possible at
/// any point through the shared handle. It keeps two tables:
///
/// - the content catalog: every type tag the bookmarks system knows how to
///   resolve, populated on registration and never shrunk, and
/// - the handler table: the subset of types currently being handled.
///
/// Keeping them separate preserves the view's distinction between an
/// invalid model and a known-but-unregistered one.
pub struct Registry {
    backend: Arc<dyn Backend>,
    sources: RwLock<HashMap<String, Arc<dyn ContentSource>>>,
    handlers: RwLock<HashMap<String, Arc<dyn Handler>>>,
    signals: SignalHub,
}

impl Registry {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            sources: RwLock::new(HashMap::new()),
            handlers: RwLock::new(HashMap::new()),
            signals: SignalHub::new(),
        }
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub fn signals(&self) -> &SignalHub {
        &self.signals
    }

    /// Register one or more content sources under a shared handler.
    /// Fails with `AlreadyHandled` (before touching anything) if any of
    /// the types already has a handler.
    pub fn register(
        &self,
        sources: Vec<Arc<dyn ContentSource>>,
        handler: Arc<dyn Handler>,
    ) -> Result<(), BookmarksError> {
        let mut handlers = self.handlers.write().expect("registry lock poisoned");
        for source in &sources {
            if handlers.contains_key(source.content_type()) {
                return Err(BookmarksError::AlreadyHandled(
                    source.content_type().to_string(),
                ));
            }
        }
        let mut catalog = self.sources.write().expect("registry lock poisoned");
        for source in sources {
            let content_type = source.content_type().to_string();
            info!(content_type = %content_type, "registering bookmark handler");
            catalog.insert(content_type.clone(), source);
            handlers.insert(content_type, handler.clone());
        }
        Ok(())
    }

    /// Register a single source with the default handler.
    pub fn register_default(&self, source: Arc<dyn ContentSource>) -> Result<(), BookmarksError> {
        self.register(vec![source], Arc::new(DefaultHandler::new()))
    }

    /// Stop handling the given content types. Fails with `NotHandled`
    /// (before touching anything) if any was never registered. The content
    /// catalog keeps the sources.
    pub fn unregister(&self, content_types: &[&str]) -> Result<(), BookmarksError> {
        let mut handlers = self.handlers.write().expect("registry lock poisoned");
        for content_type in content_types {
            if !handlers.contains_key(*content_type) {
                return Err(BookmarksError::NotHandled(content_type.to_string()));
            }
        }
        for content_type in content_types {
            handlers.remove(*content_type);
            info!(content_type = %content_type, "unregistered bookmark handler");
        }
        Ok(())
    }

    pub fn get_handler(&self, content_type: &str) -> Option<Arc<dyn Handler>> {
        self.handlers
            .read()
            .expect("registry lock poisoned")
            .get(content_type)
            .cloned()
    }

    pub fn get_source(&self, content_type: &str) -> Option<Arc<dyn ContentSource>> {
        self.sources
            .read()
            .expect("registry lock poisoned")
            .get(content_type)
            .cloned()
    }

    /// Pre-save relay: the owning handler's `pre_add`/`pre_remove` (chosen
    /// by the event's action) runs first, then every connected receiver.
    /// Any `Abort` kills the operation; an unhandled model always aborts.
    pub fn dispatch_pre_save(&self, ctx: &RequestContext, event: &BookmarkEvent) -> Flow {
        let handler_flow = match self.get_handler(&event.target.content_type) {
            Some(handler) => match event.action {
                BookmarkAction::Add => handler.pre_add(ctx, event),
                BookmarkAction::Remove => handler.pre_remove(ctx, event),
            },
            None => Flow::Abort,
        };
        let hub_flow = self.signals.send_pre_save(ctx, event);
        if handler_flow.aborted() || hub_flow.aborted() {
            debug!(target = %event.target, key = %event.key, "bookmark operation aborted by receiver");
            Flow::Abort
        } else {
            Flow::Proceed
        }
    }

    /// Post-save relay: handler hook first, then connected receivers.
    pub fn dispatch_post_save(&self, ctx: &RequestContext, event: &SavedEvent) {
        if let Some(handler) = self.get_handler(&event.bookmark.content_type) {
            if event.created {
                handler.post_add(ctx, event.bookmark);
            } else {
                handler.post_remove(ctx, event.bookmark);
            }
        }
        self.signals.send_post_save(ctx, event);
    }

    /// The target entity is being deleted by the host application; purge
    /// every bookmark referencing it. A no-op for unhandled models.
    pub async fn deleting_target_object(
        &self,
        target: &ContentRef,
    ) -> Result<u64, BookmarksError> {
        if self.get_handler(&target.content_type).is_none() {
            debug!(target = %target, "delete notification for unhandled model, ignoring");
            return Ok(0);
        }
        let purged = self.backend.remove_all_for(target).await?;
        info!(target = %target, purged, "purged bookmarks for deleted target");
        Ok(purged)
    }
}
